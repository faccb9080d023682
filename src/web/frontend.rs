//! Embedded HTML/CSS/JS frontend for the datachat web UI.
//!
//! The whole page is compiled into the binary as a string constant. The only
//! external asset is plotly.js, which draws the chart figures returned by
//! `/api/ask` as-is.

/// The complete single-page chat HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>datachat</title>
<script src="https://cdn.plot.ly/plotly-2.35.2.min.js" charset="utf-8"></script>
<style>
:root {
  --bg: #f7f7f8;
  --surface: #ffffff;
  --border: #e5e5e5;
  --text: #202123;
  --text-muted: #6e6e80;
  --accent: #10a37f;
  --warn: #d29922;
  --radius: 10px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 15px;
  line-height: 1.55;
}

.app {
  display: grid;
  grid-template-columns: 280px 1fr;
  height: 100vh;
}

/* Sidebar */
aside {
  background: var(--surface);
  border-right: 1px solid var(--border);
  padding: 20px;
  display: flex;
  flex-direction: column;
  gap: 16px;
}

aside h1 { font-size: 20px; font-weight: 600; }
aside h1 span { color: var(--accent); }
aside label { font-size: 12px; color: var(--text-muted); text-transform: uppercase; }
aside select, aside button {
  width: 100%;
  padding: 8px 10px;
  border: 1px solid var(--border);
  border-radius: 6px;
  background: var(--surface);
  font: inherit;
}
aside button { cursor: pointer; }
aside button:hover { border-color: var(--accent); }
.summary { font-size: 13px; color: var(--text-muted); }

.badge {
  display: inline-block;
  padding: 2px 8px;
  border-radius: 10px;
  font-size: 12px;
  border: 1px solid var(--border);
}
.badge.ok { border-color: var(--accent); color: var(--accent); }
.badge.warn { border-color: var(--warn); color: var(--warn); }

/* Chat */
main { display: flex; flex-direction: column; height: 100vh; }
#messages { flex: 1; overflow-y: auto; padding: 24px 10%; }

.msg { margin-bottom: 18px; display: flex; }
.msg.user { justify-content: flex-end; }
.bubble {
  max-width: 85%;
  padding: 12px 16px;
  border-radius: var(--radius);
  white-space: pre-wrap;
}
.msg.user .bubble { background: var(--accent); color: #fff; }
.msg.assistant .bubble { background: var(--surface); border: 1px solid var(--border); }

.chart { margin-top: 12px; min-height: 360px; }

.dashboard { margin-top: 12px; border: 1px solid var(--border); border-radius: var(--radius); overflow: hidden; }
.dashboard header { padding: 8px 12px; font-size: 13px; font-weight: 600; border-bottom: 1px solid var(--border); }
.dashboard iframe { width: 100%; height: 480px; border: 0; }

.followups { margin-top: 10px; display: flex; flex-wrap: wrap; gap: 6px; }
.chip {
  padding: 6px 12px;
  border-radius: 16px;
  border: 1px solid var(--accent);
  background: transparent;
  color: var(--accent);
  font-size: 13px;
  cursor: pointer;
}
.chip:hover { background: var(--accent); color: #fff; }

.meta { margin-top: 6px; font-size: 11px; color: var(--text-muted); }

.empty { text-align: center; color: var(--text-muted); margin-top: 15vh; }
.empty .chip { margin: 4px; }

form {
  display: flex;
  gap: 8px;
  padding: 16px 10%;
  border-top: 1px solid var(--border);
  background: var(--surface);
}
form input {
  flex: 1;
  padding: 12px 14px;
  border: 1px solid var(--border);
  border-radius: var(--radius);
  font: inherit;
}
form button {
  padding: 0 20px;
  border: none;
  border-radius: var(--radius);
  background: var(--accent);
  color: #fff;
  font: inherit;
  cursor: pointer;
}
form button:disabled { opacity: 0.5; cursor: default; }

.error { color: #c0392b; font-size: 13px; padding: 0 10% 8px; }
</style>
</head>
<body>
<div class="app">
  <aside>
    <h1><span>data</span>chat</h1>
    <div>
      <label for="dataset">Dataset</label>
      <select id="dataset"></select>
    </div>
    <p class="summary" id="summary"></p>
    <button id="clear" type="button">Clear conversation</button>
    <div id="health"></div>
  </aside>
  <main>
    <div id="messages"></div>
    <div class="error" id="error"></div>
    <form id="ask">
      <input id="question" autocomplete="off" placeholder="Ask a question about the data...">
      <button id="send" type="submit">Send</button>
    </form>
  </main>
</div>

<script>
const SUGGESTIONS = [
  'What is the average price?',
  'Which town has the highest prices?',
  'Show a chart of prices by flat type',
  'Show me the dashboard',
];

let datasets = [];

async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body !== undefined) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const resp = await fetch(path, opts);
  const data = await resp.json();
  if (!resp.ok) throw new Error(data.error || resp.statusText);
  return data;
}

function el(tag, cls, text) {
  const node = document.createElement(tag);
  if (cls) node.className = cls;
  if (text !== undefined) node.textContent = text;
  return node;
}

function showError(msg) {
  document.getElementById('error').textContent = msg || '';
}

function renderAssistant(bubble, parts, meta) {
  bubble.appendChild(document.createTextNode(parts.display));

  if (parts.chart) {
    const div = el('div', 'chart');
    bubble.appendChild(div);
    requestAnimationFrame(() =>
      Plotly.newPlot(div, parts.chart.data, parts.chart.layout, { responsive: true, displaylogo: false }));
  }

  if (parts.dashboard && /^https?:\/\//i.test(parts.dashboard.url)) {
    const box = el('div', 'dashboard');
    box.appendChild(el('header', null, parts.dashboard.name));
    const frame = document.createElement('iframe');
    frame.src = parts.dashboard.url;
    frame.setAttribute('allowfullscreen', 'true');
    box.appendChild(frame);
    bubble.appendChild(box);
  }

  if (parts.followups && parts.followups.length) {
    const chips = el('div', 'followups');
    for (const q of parts.followups) {
      const chip = el('button', 'chip', q);
      chip.type = 'button';
      chip.onclick = () => ask(q);
      chips.appendChild(chip);
    }
    bubble.appendChild(chips);
  }

  if (meta) bubble.appendChild(el('div', 'meta', meta));
}

function appendMessage(role, text, parts, meta) {
  const box = document.getElementById('messages');
  const empty = box.querySelector('.empty');
  if (empty) empty.remove();

  const row = el('div', 'msg ' + role);
  const bubble = el('div', 'bubble');
  if (role === 'assistant' && parts) {
    renderAssistant(bubble, parts, meta);
  } else {
    bubble.textContent = text;
  }
  row.appendChild(bubble);
  box.appendChild(row);
  box.scrollTop = box.scrollHeight;
}

function renderEmpty() {
  const box = document.getElementById('messages');
  box.innerHTML = '';
  const empty = el('div', 'empty');
  empty.appendChild(el('p', null, 'Ask anything about the selected dataset.'));
  for (const q of SUGGESTIONS) {
    const chip = el('button', 'chip', q);
    chip.type = 'button';
    chip.onclick = () => ask(q);
    empty.appendChild(chip);
  }
  box.appendChild(empty);
}

function renderSession(session) {
  renderEmpty();
  for (const m of session.messages) {
    appendMessage(m.role, m.display, m.rendered);
  }
  const ds = datasets.find(d => d.id === session.dataset_id);
  document.getElementById('summary').textContent = ds ? ds.summary : '';
  document.getElementById('dataset').value = session.dataset_id;
}

async function ask(question) {
  question = (question || '').trim();
  if (!question) return;
  showError('');
  const input = document.getElementById('question');
  const send = document.getElementById('send');
  input.value = '';
  send.disabled = true;
  appendMessage('user', question);
  try {
    const reply = await api('POST', '/api/ask', { question });
    const meta = reply.fallback ? 'offline answer (' + reply.provider + ')' : reply.provider;
    appendMessage('assistant', reply.display, reply, meta);
  } catch (e) {
    showError(e.message);
  } finally {
    send.disabled = false;
    input.focus();
  }
}

async function loadHealth() {
  try {
    const h = await api('GET', '/api/health');
    const badge = el('span', 'badge ' + (h.provider_issue || !h.reachable ? 'warn' : 'ok'), h.provider);
    if (h.provider_issue) badge.title = h.provider_issue;
    const box = document.getElementById('health');
    box.innerHTML = '';
    box.appendChild(badge);
  } catch (e) {
    showError(e.message);
  }
}

async function init() {
  const list = await api('GET', '/api/datasets');
  datasets = list.datasets;
  const select = document.getElementById('dataset');
  for (const d of datasets) {
    const opt = el('option', null, d.name);
    opt.value = d.id;
    select.appendChild(opt);
  }
  select.onchange = async () => {
    try {
      renderSession(await api('POST', '/api/session/dataset', { dataset_id: select.value }));
    } catch (e) {
      showError(e.message);
    }
  };
  document.getElementById('clear').onclick = async () =>
    renderSession(await api('POST', '/api/session/clear'));
  document.getElementById('ask').onsubmit = (ev) => {
    ev.preventDefault();
    ask(document.getElementById('question').value);
  };

  renderSession(await api('GET', '/api/session'));
  loadHealth();
}

init().catch(e => showError(e.message));
</script>
</body>
</html>
"##;
