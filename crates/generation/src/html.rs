use shared::{domain::GuiDescriptor, protocol::GuiInfo};

/// Minimal HTML document bootstrapping the runtime script for one GUI.
pub fn shell(
    gui: &GuiDescriptor,
    structure_file: &str,
    runtime_file: &str,
) -> Result<String, serde_json::Error> {
    let info = GuiInfo {
        name: gui.name.clone(),
        structure: format!("/{structure_file}"),
        stylesheet: gui.stylesheet_path.clone(),
    };
    // `</script>` inside a string literal would still end the inline script.
    let info = serde_json::to_string(&info)?.replace("</", "<\\/");
    let title = escape(&gui.name);

    Ok(format!(
        "<!DOCTYPE html><html><head><meta charset=\"UTF-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\
         <title>{title}</title>\
         <script type=\"text/javascript\">const gui={info};</script>\
         <script type=\"text/javascript\" src=\"/{runtime_file}\"></script>\
         </head><body></body></html>"
    ))
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
