// src/render.rs
use crate::layout::Canvas;
use crate::models::Region;
use crate::orchestrator::{RenderOutcome, WordCloud};

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn message_text(canvas: &Canvas, text: &str, fill: &str) -> String {
    format!(
        "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"16px\" fill=\"{}\">{}</text>\n",
        canvas.width / 2.0,
        canvas.height / 2.0,
        fill,
        escape(text)
    )
}

/// Plain SVG for whichever state the pass ended in.
pub fn render_svg(outcome: &RenderOutcome, canvas: &Canvas) -> String {
    let canvas = outcome.cloud().map(|c| c.canvas).unwrap_or(*canvas);
    let mut out = String::new();
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
        w = canvas.width,
        h = canvas.height
    ));

    match outcome {
        RenderOutcome::Ready { cloud } => render_cloud_body(&mut out, cloud),
        RenderOutcome::NoData { message } => out.push_str(&message_text(&canvas, message, "#999")),
        RenderOutcome::Failed { message } => out.push_str(&message_text(&canvas, message, "#ff4d4f")),
    }

    out.push_str("</svg>\n");
    out
}

fn render_cloud_body(out: &mut String, cloud: &WordCloud) {
    out.push_str("  <g class=\"region-dividers\">\n");
    for d in &cloud.dividers {
        out.push_str(&format!(
            "    <line x1=\"{x:.1}\" y1=\"{:.1}\" x2=\"{x:.1}\" y2=\"{:.1}\" stroke=\"#e5e7eb\" stroke-width=\"2\" stroke-dasharray=\"8,4\"/>\n",
            d.y0,
            d.y1,
            x = d.x
        ));
    }
    for r in &cloud.regions {
        out.push_str(&format!(
            "    <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"15px\" font-weight=\"600\" fill=\"{}\">{}</text>\n",
            r.header.x,
            r.header.y,
            r.header.color,
            escape(r.header.text)
        ));
    }
    out.push_str("  </g>\n");

    for r in &cloud.regions {
        out.push_str(&format!("  <g class=\"region-{}\">\n", region_class(r.region)));
        for p in &r.terms {
            out.push_str(&format!(
                "    <text x=\"{x:.1}\" y=\"{y:.1}\" text-anchor=\"middle\" dominant-baseline=\"middle\" transform=\"rotate({} {x:.1} {y:.1})\" font-size=\"{:.1}px\" font-weight=\"{}\" fill=\"{}\" opacity=\"{:.2}\">{}</text>\n",
                p.rotation_deg,
                p.size,
                if p.bold { "bold" } else { "normal" },
                p.color,
                p.opacity,
                escape(&p.term.text),
                x = p.x,
                y = p.y
            ));
        }
        out.push_str("  </g>\n");
    }
}

fn region_class(region: Region) -> &'static str {
    match region {
        Region::ExclusiveConservative => "conservative",
        Region::Shared => "shared",
        Region::ExclusiveLiberal => "liberal",
    }
}
