use super::{OutputRecord, NO_RESULTS};
use crate::theme::{self, StatusTone, Theme};

fn json_for_script_tag(value: &str) -> String {
    value.replace("</", "<\\/")
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn render_rows(records: &[OutputRecord], theme: Theme) -> String {
    let palette = theme.palette();
    let mut out = String::new();
    for (i, r) in records.iter().enumerate() {
        let tone = StatusTone::classify(&r.status);
        let src = r
            .image
            .as_deref()
            .or_else(|| r.sources.as_ref().map(|s| s.primary.as_str()));
        let fallback = r
            .sources
            .as_ref()
            .map(|s| s.fallback.as_str())
            .filter(|f| Some(*f) != src)
            .unwrap_or_default();
        let action = match src {
            Some(src) => format!(
                r#"<button class="see" data-src="{}" data-fallback="{}" data-name="{}">See Image</button>"#,
                escape_html(src),
                escape_html(fallback),
                escape_html(&r.name)
            ),
            None => r#"<span class="muted">No image</span>"#.to_string(),
        };
        out.push_str(&format!(
            r#"      <tr class="{parity}">
        <td>{action}</td>
        <td class="name">{name}</td>
        <td>{pool}</td>
        <td class="status" style="color:{status_color}">{status}</td>
      </tr>
"#,
            parity = if i % 2 == 0 { "even" } else { "odd" },
            action = action,
            name = escape_html(&r.name),
            pool = escape_html(&r.pool),
            status_color = tone.css_color(&palette),
            status = escape_html(theme::status_label(&r.status)),
        ));
    }
    out
}

pub fn render_html(records: &[OutputRecord], theme: Theme, title: &str) -> Vec<u8> {
    let palette = theme.palette();
    let header = serde_json::to_string(&theme.header()).unwrap_or_else(|_| "null".to_string());
    let header = json_for_script_tag(&header);
    let title = escape_html(title);

    let body = if records.is_empty() {
        format!(r#"    <p class="muted">{NO_RESULTS}</p>"#)
    } else {
        format!(
            r#"    <table>
      <thead>
        <tr><th>Action</th><th>Blueprint Name</th><th>Pool</th><th>Status</th></tr>
      </thead>
      <tbody>
{rows}      </tbody>
    </table>"#,
            rows = render_rows(records, theme)
        )
    };

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>{title}</title>
  <style>
    body {{
      margin: 0;
      min-height: 100vh;
      padding: 2rem;
      background: {background};
      color: {color};
      font-family: "Segoe UI", Tahoma, Geneva, Verdana, sans-serif;
    }}
    header {{ position: relative; margin-bottom: 1rem; }}
    button {{
      padding: 0.5rem 1rem;
      background: {button_bg};
      color: {button_color};
      border: none;
      border-radius: 6px;
      font-weight: 700;
      cursor: pointer;
    }}
    table {{ border-collapse: collapse; width: 100%; border-radius: 8px; overflow: hidden; }}
    thead tr {{ position: sticky; top: 0; background: {button_bg}; color: {button_color}; }}
    th, td {{ padding: 12px 16px; text-align: left; border-bottom: 1px solid {border}; }}
    tr.even {{ background: {input_bg}dd; }}
    tr.odd {{ background: {input_bg}aa; }}
    td.name, td.status {{ font-weight: 600; }}
    .muted {{ color: {input_color}; opacity: 0.8; }}
    #lightbox {{
      position: fixed; inset: 0; display: none;
      align-items: center; justify-content: center; flex-direction: column;
      background: rgba(0, 0, 0, 0.75); z-index: 9999; color: #fff;
    }}
    #lightbox.open {{ display: flex; }}
    #lightbox img {{ max-width: 80%; max-height: 80%; border-radius: 8px; }}
  </style>
</head>
<body>
  <script type="application/json" id="header-effect">{header}</script>
  <header id="header"><h1>{title}</h1></header>
  <main>
{body}
  </main>
  <div id="lightbox">
    <h3 id="lightbox-title"></h3>
    <img id="lightbox-image" alt=""/>
    <button id="lightbox-close" style="margin-top:1rem">Close</button>
  </div>
  <script>
    (function () {{
      var box = document.getElementById("lightbox");
      var img = document.getElementById("lightbox-image");
      var heading = document.getElementById("lightbox-title");
      document.querySelectorAll("button.see").forEach(function (btn) {{
        btn.addEventListener("click", function () {{
          img.dataset.fallback = btn.dataset.fallback || "";
          img.src = btn.dataset.src;
          img.alt = btn.dataset.name;
          heading.textContent = btn.dataset.name;
          box.classList.add("open");
        }});
      }});
      img.addEventListener("error", function () {{
        var next = img.dataset.fallback;
        if (next) {{
          img.dataset.fallback = "";
          img.src = next;
        }}
      }});
      function close() {{
        box.classList.remove("open");
        img.dataset.fallback = "";
        img.removeAttribute("src");
      }}
      box.addEventListener("click", close);
      document.getElementById("lightbox-close").addEventListener("click", function (e) {{
        e.stopPropagation();
        close();
      }});
      img.addEventListener("click", function (e) {{ e.stopPropagation(); }});

      var effect = JSON.parse(document.getElementById("header-effect").textContent);
      if (effect && effect.kind === "particles" && window.FinisherHeader) {{
        new window.FinisherHeader({{
          attachTo: document.getElementById("header"),
          count: effect.count,
          size: {{ min: effect.size[0], max: effect.size[1], pulse: 0 }},
          speed: {{
            x: {{ min: effect.speed_x[0], max: effect.speed_x[1] }},
            y: {{ min: effect.speed_y[0], max: effect.speed_y[1] }}
          }},
          colors: {{ background: effect.background, particles: effect.particles }},
          blending: effect.blending,
          opacity: {{ center: effect.opacity_center, edge: effect.opacity_edge }},
          skew: effect.skew,
          shapes: effect.shapes
        }});
      }}
    }})();
  </script>
</body>
</html>
"####,
        title = title,
        background = palette.background,
        color = palette.color,
        button_bg = palette.button_bg,
        button_color = palette.button_color,
        input_bg = palette.input_bg,
        input_color = palette.input_color,
        border = palette.border,
        header = header,
        body = body,
    );

    html.into_bytes()
}
