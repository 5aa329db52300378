/// Returns the store page served at `/static/index.html`.
///
/// Browses the store through `/list/` and posts pasted captures to
/// `/save/<name>` as a `data` form field, the same contract the upload
/// client uses.
pub fn index_html(title: &str) -> String {
    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <style>
    body {{ font-family: sans-serif; margin: 2rem; max-width: 56rem; }}
    textarea {{ width: 100%; height: 12rem; font-family: monospace; }}
    #files li {{ cursor: pointer; }}
    .error {{ color: #b00; }}
  </style>
</head>
<body>
  <h1>{title}</h1>

  <section>
    <h2>Save a capture</h2>
    <label>Name <input id="name" value="blank"></label>
    <textarea id="data"
      placeholder='[{{"palmNormal":[0,-1,0],"stabilizedPalmPosition":[0,200,0]}}]'></textarea>
    <button id="save">Save</button>
    <span id="status"></span>
  </section>

  <section>
    <h2>Browse</h2>
    <label>Path <input id="path" value="."></label>
    <button id="list">List</button>
    <ul id="files"></ul>
  </section>

  <script>
{script}
  </script>
</body>
</html>
"#,
        script = page_js()
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Returns the page script.
pub fn page_js() -> &'static str {
    r#"    const $ = (id) => document.getElementById(id);

    async function save() {
      const name = encodeURIComponent($("name").value || "blank");
      const body = new URLSearchParams({ data: $("data").value });
      const res = await fetch("/save/" + name, { method: "POST", body });
      $("status").textContent = res.ok ? await res.text() : "failed (" + res.status + ")";
    }

    async function list(path) {
      $("path").value = path;
      const res = await fetch("/list/" + path);
      const reply = await res.json();
      const ul = $("files");
      ul.innerHTML = "";
      if (reply.error) {
        ul.innerHTML = '<li class="error">' + (reply.kind || reply.error) + "</li>";
        return;
      }
      for (const file of reply.files) {
        const li = document.createElement("li");
        li.textContent = file;
        li.onclick = () => list(file);
        ul.appendChild(li);
      }
    }

    $("save").onclick = save;
    $("list").onclick = () => list($("path").value);"#
}
