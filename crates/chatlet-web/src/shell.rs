//! The embedded single-page shell.
//!
//! The page is deliberately dumb glue: it applies surface commands received
//! over the WebSocket to the DOM and reports raw interaction events back. All
//! formatting, scroll policy, and state live on the host side.

pub const SHELL_HTML: &str = r##"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Chatlet</title>
<style>
  :root { color-scheme: dark; }
  * { box-sizing: border-box; }
  body {
    margin: 0; height: 100vh; display: flex; flex-direction: column;
    background: #1e1e2e; color: #cdd6f4;
    font-family: system-ui, -apple-system, sans-serif;
  }
  header {
    display: flex; align-items: center; gap: 12px;
    padding: 10px 16px; background: #181825; border-bottom: 1px solid #313244;
  }
  header h1 { margin: 0; font-size: 15px; font-weight: 600; flex: 1; }
  select {
    background: #313244; color: inherit; border: 1px solid #45475a;
    border-radius: 6px; padding: 4px 8px; font-size: 13px;
  }
  #messages { flex: 1; overflow-y: auto; padding: 16px; }
  .msg { max-width: 760px; margin: 0 auto 12px; padding: 10px 14px; border-radius: 10px; }
  .msg.user { background: #313244; }
  .msg.assistant { background: #24243a; }
  .msg.error .content { color: #f38ba8; }
  .content p { margin: 6px 0; }
  .content pre {
    position: relative; background: #11111b; border-radius: 8px;
    padding: 10px; overflow-x: auto; font-size: 13px;
  }
  .copy-btn {
    position: absolute; top: 6px; right: 6px;
    background: #45475a; color: inherit; border: none; border-radius: 5px;
    padding: 2px 8px; font-size: 11px; cursor: pointer;
  }
  .typing { display: none; font-size: 12px; opacity: 0.6; }
  .msg.is-typing .typing { display: block; }
  #jump {
    position: fixed; right: 24px; bottom: 84px; display: none;
    background: #89b4fa; color: #1e1e2e; border: none; border-radius: 999px;
    padding: 8px 14px; cursor: pointer;
  }
  form {
    display: flex; gap: 8px; padding: 12px 16px;
    background: #181825; border-top: 1px solid #313244;
  }
  input[type=text] {
    flex: 1; background: #313244; color: inherit; border: 1px solid #45475a;
    border-radius: 8px; padding: 10px 12px; font-size: 14px;
  }
  button[type=submit] {
    background: #89b4fa; color: #1e1e2e; border: none; border-radius: 8px;
    padding: 0 18px; font-weight: 600; cursor: pointer;
  }
  button[type=submit]:disabled { opacity: 0.5; cursor: default; }
</style>
</head>
<body>
<header>
  <h1>Chatlet</h1>
  <select id="model"></select>
</header>
<div id="messages"></div>
<button id="jump">Jump to bottom</button>
<form id="composer">
  <input id="input" type="text" autocomplete="off" placeholder="Say something...">
  <button id="send" type="submit">Send</button>
</form>
<script>
(function () {
  var messages = document.getElementById("messages");
  var composer = document.getElementById("composer");
  var input = document.getElementById("input");
  var send = document.getElementById("send");
  var jump = document.getElementById("jump");
  var model = document.getElementById("model");

  var proto = location.protocol === "https:" ? "wss://" : "ws://";
  var ws = new WebSocket(proto + location.host + "/ws");

  function emit(event) {
    if (ws.readyState === WebSocket.OPEN) ws.send(JSON.stringify(event));
  }

  function reportScroll() {
    emit({ type: "scroll", metrics: {
      scroll_top: messages.scrollTop,
      client_height: messages.clientHeight,
      scroll_height: messages.scrollHeight
    }});
  }

  function bubble(id) {
    return messages.querySelector('.msg[data-id="' + id + '"]');
  }

  var apply = {
    append_message: function (cmd) {
      var msg = document.createElement("div");
      msg.className = "msg " + cmd.role;
      msg.dataset.id = cmd.id;
      msg.innerHTML =
        '<div class="typing">Assistant is typing...</div>' +
        '<div class="content"></div>';
      msg.querySelector(".content").innerHTML = cmd.html;
      messages.appendChild(msg);
      reportScroll();
    },
    replace_content: function (cmd) {
      var msg = bubble(cmd.id);
      if (msg) msg.querySelector(".content").innerHTML = cmd.html;
      reportScroll();
    },
    set_error: function (cmd) {
      var msg = bubble(cmd.id);
      if (!msg) return;
      msg.classList.add("error");
      msg.querySelector(".content").textContent = cmd.text;
    },
    set_typing: function (cmd) {
      var msg = bubble(cmd.id);
      if (msg) msg.classList.toggle("is-typing", cmd.visible);
    },
    set_send_enabled: function (cmd) {
      send.disabled = !cmd.enabled;
    },
    scroll_to_bottom: function () {
      messages.scrollTop = messages.scrollHeight;
      reportScroll();
    },
    set_jump_visible: function (cmd) {
      jump.style.display = cmd.visible ? "block" : "none";
    },
    set_copy_label: function (cmd) {
      var msg = bubble(cmd.id);
      if (!msg) return;
      var btn = msg.querySelector('.copy-btn[data-block="' + cmd.block + '"]');
      if (btn) btn.textContent = cmd.label;
    },
    set_model_options: function (cmd) {
      model.innerHTML = "";
      cmd.models.forEach(function (name) {
        var option = document.createElement("option");
        option.value = name;
        option.textContent = name;
        if (name === cmd.selected) option.selected = true;
        model.appendChild(option);
      });
    },
    set_model_error: function (cmd) {
      model.innerHTML = "";
      var option = document.createElement("option");
      option.textContent = cmd.message;
      option.disabled = true;
      option.selected = true;
      model.appendChild(option);
    },
    write_clipboard: function (cmd) {
      if (navigator.clipboard) {
        navigator.clipboard.writeText(cmd.text).catch(function () {});
      }
    }
  };

  ws.onmessage = function (raw) {
    var cmd = JSON.parse(raw.data);
    var handler = apply[cmd.type];
    if (handler) handler(cmd);
  };

  composer.addEventListener("submit", function (ev) {
    ev.preventDefault();
    emit({ type: "submit", text: input.value });
    input.value = "";
  });

  messages.addEventListener("scroll", reportScroll);

  messages.addEventListener("click", function (ev) {
    var btn = ev.target.closest(".copy-btn");
    if (!btn) return;
    var msg = btn.closest(".msg");
    emit({
      type: "copy_clicked",
      id: Number(msg.dataset.id),
      block: Number(btn.dataset.block)
    });
  });

  jump.addEventListener("click", function () {
    emit({ type: "jump_clicked" });
  });

  model.addEventListener("change", function () {
    emit({ type: "model_selected", model: model.value });
  });
})();
</script>
</body>
</html>
"##;
