use std::io::{self, Write};

use super::{Emphasis, Interface, StatusRegion, Tone};

fn tone_label(tone: Tone) -> &'static str {
    match tone {
        Tone::Info => "info",
        Tone::Success => "ok",
        Tone::Danger => "error",
    }
}

fn draw_status(out: &mut impl Write, title: &str, region: &StatusRegion) -> io::Result<()> {
    if !region.visible {
        return Ok(());
    }
    match &region.notice {
        Some(notice) => {
            write!(out, "[{title}] {}: {}", tone_label(notice.tone), notice.text)?;
            if let Some(link) = &notice.link {
                write!(out, " -> {} {}", link.label, link.href)?;
            }
            writeln!(out)
        }
        None => writeln!(out, "[{title}] working..."),
    }
}

/// Prints every visible part of the interface.
pub fn draw(interface: &Interface, out: &mut impl Write) -> io::Result<()> {
    draw_status(out, "generate", &interface.generation_status)?;
    draw_status(out, "capture", &interface.capture_status)?;
    if interface.loading {
        writeln!(out, "[analysis] loading...")?;
    }
    if !interface.results_visible {
        return Ok(());
    }

    let stats = &interface.statistics;
    writeln!(out, "== Analysis results ==")?;
    writeln!(out, "  total records:      {}", stats.total_records)?;
    writeln!(out, "  anomalies:          {}", stats.anomaly_count)?;
    writeln!(out, "  anomaly percentage: {}", stats.anomaly_percentage)?;
    if let Some(src) = &interface.scatter_src {
        writeln!(out, "  scatter plot:       {src}")?;
    }
    if let Some(src) = &interface.distribution_src {
        writeln!(out, "  distribution plot:  {src}")?;
    }
    if let Some(target) = interface.activate_download() {
        writeln!(out, "  anomaly report:     {target}")?;
    }

    if interface.recommendations_visible {
        writeln!(out, "== Recommendations ==")?;
        for block in &interface.recommendations {
            let marker = match block.emphasis {
                Emphasis::High => "!!",
                Emphasis::Elevated => "! ",
            };
            writeln!(out, "{marker} {}", block.heading)?;
            writeln!(out, "   {}", block.description)?;
            for item in &block.items {
                writeln!(out, "   - {item}")?;
            }
        }
    }
    Ok(())
}
