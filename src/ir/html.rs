//! # HTML Rendering
//!
//! Renders an IR program as printable HTML for browser printing and PDF
//! export. The markup follows the program op by op, so the HTML carries the
//! same fields in the same order as the ESC/POS bytes. Layout is not
//! byte-exact: text is kept as Unicode and columns become a monospace block.

use super::ops::{Op, Program, StyleState};
use crate::protocol::text::TextSize;

const STYLE: &str = "body{margin:0}\
.ticket{font-family:monospace;white-space:pre;margin:0 auto}\
.line{min-height:1.2em}\
.left{text-align:left}.center{text-align:center}.right{text-align:right}\
.bold{font-weight:bold}.large{font-size:2em}\
.cut{page-break-after:always;border-bottom:1px dashed #999;margin:1em 0}";

impl Program {
    /// Render the program as a standalone HTML document.
    ///
    /// `columns` sets the page width in characters (42 or 32).
    pub fn to_html(&self, title: &str, columns: usize) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>");
        html_escape_into(&mut out, title);
        out.push_str("</title><style>");
        out.push_str(STYLE);
        out.push_str("</style></head><body>\n");
        out.push_str(&format!(
            "<div class=\"ticket\" style=\"width:{}ch\">\n",
            columns
        ));
        out.push_str(&self.to_html_fragment());
        out.push_str("</div>\n</body></html>\n");
        out
    }

    /// Render only the body markup (one `<div>` per printed line).
    pub fn to_html_fragment(&self) -> String {
        let mut out = String::new();
        let mut style = StyleState::default();
        let mut line = String::new();
        let mut line_align = style.alignment;
        let mut line_open = false;

        for op in &self.ops {
            if style.apply(op) {
                continue;
            }
            match op {
                Op::Text(s) => {
                    if !line_open {
                        line_align = style.alignment;
                        line_open = true;
                    }
                    push_span(&mut line, s, &style);
                }
                Op::Newline => {
                    if !line_open {
                        line_align = style.alignment;
                    }
                    out.push_str(&format!(
                        "<div class=\"line {}\">{}</div>\n",
                        line_align.as_str(),
                        line
                    ));
                    line.clear();
                    line_open = false;
                }
                Op::Feed { lines } => {
                    out.push_str(&format!(
                        "<div class=\"feed\" style=\"height:{}em\"></div>\n",
                        lines
                    ));
                }
                Op::Cut { .. } => out.push_str("<div class=\"cut\"></div>\n"),
                Op::SetCodepage(_) | Op::DrawerPulse => {}
                Op::Init | Op::SetAlign(_) | Op::SetBold(_) | Op::SetSize(_) => {}
            }
        }

        if line_open {
            out.push_str(&format!(
                "<div class=\"line {}\">{}</div>\n",
                line_align.as_str(),
                line
            ));
        }
        out
    }
}

fn push_span(out: &mut String, text: &str, style: &StyleState) {
    let mut classes = Vec::new();
    if style.bold {
        classes.push("bold");
    }
    if style.size == TextSize::Large {
        classes.push("large");
    }

    if classes.is_empty() {
        html_escape_into(out, text);
    } else {
        out.push_str(&format!("<span class=\"{}\">", classes.join(" ")));
        html_escape_into(out, text);
        out.push_str("</span>");
    }
}

/// HTML-escape a string into the output buffer.
fn html_escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\r' => {}
            _ => out.push(c),
        }
    }
}
