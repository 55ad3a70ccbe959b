//! Review report rendering and persistence.

use anyhow::Result;
use std::path::PathBuf;

use crate::config::ReportConfig;
use crate::github::PrDetails;

/// Write the markdown review report and return its path.
///
/// The reports directory is created on demand; an existing report for the
/// same PR number is overwritten.
pub fn write_report(config: &ReportConfig, details: &PrDetails, analysis: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(&config.dir)?;

    let content = render_report(details, analysis, &chrono::Utc::now().to_rfc3339());
    let path = config
        .dir
        .join(format!("PR_{}_Review_Report.md", details.number));
    std::fs::write(&path, content)?;

    Ok(path)
}

fn render_report(details: &PrDetails, analysis: &str, generated_at: &str) -> String {
    format!(
        "# Review Report for PR #{number}\n\
         \n\
         **Title**: {title}\n\
         \n\
         **Author**: {author}\n\
         \n\
         ## Analysis Results\n\
         \n\
         {analysis}\n\
         \n\
         ---\n\
         \n\
         Generated on {generated_at}\n",
        number = details.number,
        title = details.title,
        author = details.author,
        analysis = analysis,
        generated_at = generated_at,
    )
}
