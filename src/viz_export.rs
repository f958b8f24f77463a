// src/viz_export.rs
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use std::{
    fs,
    path::{Path, PathBuf},
};
use xxhash_rust::xxh3::xxh3_64;

use crate::layout::Canvas;
use crate::months::Month;
use crate::orchestrator::RenderOutcome;
use crate::render::render_svg;

/// Directory name for a selection: `<first>_<last>-<hash>`, stable for the same month list.
pub fn selection_label(months: &[Month]) -> String {
    let (Some(first), Some(last)) = (months.first(), months.last()) else {
        return "empty-selection".to_string();
    };
    let joined = months.iter().map(|m| m.to_string()).collect::<Vec<_>>().join(",");
    let hash = xxh3_64(joined.as_bytes());
    format!("{first}_{last}-{:08x}", hash as u32)
}

/// Write the pass outcome (and optionally an SVG) into `<out_root>/<label>/`.
pub fn write_cloud_bundle(
    out_root: &Path,
    months: &[Month],
    outcome: &RenderOutcome,
    canvas: &Canvas,
    with_svg: bool,
) -> Result<PathBuf> {
    let dir = out_root.join(selection_label(months));
    fs::create_dir_all(&dir).with_context(|| format!("create {:?}", dir))?;

    write_json(dir.join("viz.wordcloud.json"), outcome)?;

    let mut files = vec!["viz.wordcloud.json"];
    if with_svg {
        let svg = render_svg(outcome, canvas);
        fs::write(dir.join("wordcloud.svg"), svg.as_bytes())
            .with_context(|| format!("write {:?}", dir.join("wordcloud.svg")))?;
        files.push("wordcloud.svg");
    }

    let (status, terms) = match outcome {
        RenderOutcome::Ready { cloud } => ("ready", cloud.term_count()),
        RenderOutcome::NoData { .. } => ("no_data", 0),
        RenderOutcome::Failed { .. } => ("failed", 0),
    };
    let idx = json!({
        "months": months,
        "version": 1,
        "status": status,
        "terms": terms,
        "files": files,
    });
    write_json(dir.join("viz.index.json"), &idx)?;

    Ok(dir)
}

fn write_json<P: AsRef<Path>, T: ?Sized + Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, serde_json::to_vec_pretty(value)?).with_context(|| format!("write {:?}", path))
}
