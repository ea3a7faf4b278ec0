//! Dashboard and submissions commands.
//!
//! # Usage
//!
//! ```bash
//! agency stats
//! agency submissions list --status new --service web-creation
//! agency submissions set-status 42 contacted --status new
//! ```

use agency_core::{
    ServiceFilter, StatusFilter, Submission, SubmissionFilter, SubmissionId, SubmissionStatus,
};
use agency_web::services::{SubmissionRow, SubmissionsView};
use tracing::instrument;

use super::{CliError, Context, api_failure};

/// Build an inbox filter from the command-line flags.
///
/// # Errors
///
/// `InvalidArgument` for an unknown status.
pub fn parse_filter(status: Option<&str>, service: Option<&str>) -> Result<SubmissionFilter, CliError> {
    let status = status
        .unwrap_or_default()
        .parse::<StatusFilter>()
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    let service = ServiceFilter::parse(service.unwrap_or_default());
    Ok(SubmissionFilter { status, service })
}

/// Print the dashboard counters.
///
/// # Errors
///
/// Returns any API error; a 401 clears the session.
pub async fn stats(ctx: &Context) -> Result<(), CliError> {
    let (mut store, token) = ctx.authenticated().await?;
    let stats = match ctx.api.dashboard_stats(&token).await {
        Ok(stats) => stats,
        Err(e) => return Err(api_failure(&mut store, e).await),
    };

    let s = stats.submissions;
    println!("Submissions  total {:>5}  new {:>5}  reviewed {:>5}", s.total, s.new, s.reviewed);
    for (name, counts) in [("Posts", stats.posts), ("Courses", stats.courses)] {
        println!(
            "{name:<12} total {:>5}  published {:>5}  drafts {:>5}",
            counts.total, counts.published, counts.drafts
        );
    }
    Ok(())
}

/// List submissions matching a filter.
///
/// # Errors
///
/// Returns any API error; a 401 clears the session.
#[instrument(skip(ctx))]
pub async fn list(ctx: &Context, filter: SubmissionFilter) -> Result<(), CliError> {
    let (mut store, token) = ctx.authenticated().await?;
    let mut view = SubmissionsView::new(&ctx.api, &token, filter);

    if let Err(e) = view.fetch().await {
        return Err(api_failure(&mut store, e).await);
    }
    print_table(view.submissions());
    Ok(())
}

/// Change a submission's status and print the refreshed list.
///
/// # Errors
///
/// `InvalidArgument` for an unknown status (no call is made); otherwise any
/// API error, with a 401 clearing the session.
#[instrument(skip(ctx))]
pub async fn set_status(
    ctx: &Context,
    id: SubmissionId,
    status: &str,
    filter: SubmissionFilter,
) -> Result<(), CliError> {
    let status = status
        .parse::<SubmissionStatus>()
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;

    let (mut store, token) = ctx.authenticated().await?;
    let mut view = SubmissionsView::new(&ctx.api, &token, filter);

    let result = view.update_status(id, status).await.map(|_| ());
    print_table(view.submissions());

    match result {
        Ok(()) => {
            println!("Submission {id} marked as {}", status.label());
            Ok(())
        }
        Err(e) => Err(api_failure(&mut store, e).await),
    }
}

fn print_table(submissions: &[Submission]) {
    print!("{}", format_table(submissions));
}

/// Fixed-width submissions table, one line per row plus a count footer.
fn format_table(submissions: &[Submission]) -> String {
    use std::fmt::Write;

    if submissions.is_empty() {
        return "No submissions found\n".to_owned();
    }

    let mut out = format!(
        "{:>6}  {:<24}  {:<10}  {:<22}  {:<24}  EMAIL\n",
        "ID", "DATE", "STATUS", "SERVICE", "NAME"
    );
    for row in submissions.iter().map(SubmissionRow::from) {
        let _ = writeln!(
            out,
            "{:>6}  {:<24}  {:<10}  {:<22}  {:<24}  {}",
            row.id, row.created, row.badge.label, row.service, row.full_name, row.email
        );
    }
    let count = submissions.len();
    let _ = writeln!(out, "Showing {count} submission{}", if count == 1 { "" } else { "s" });
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert!(!parse_filter(None, None).unwrap().is_filtered());

        let filter = parse_filter(Some("contacted"), Some("seo-growth")).unwrap();
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("status", "contacted".to_string()),
                ("service", "seo-growth".to_string())
            ]
        );
    }

    #[test]
    fn test_format_table() {
        assert_eq!(format_table(&[]), "No submissions found\n");

        let submission: Submission = serde_json::from_value(serde_json::json!({
            "id": 7,
            "full_name": "Jane Doe",
            "email": "jane@example.com",
            "message": "Hello",
            "service_slug": "web-creation",
            "status": "new",
            "created_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        let table = format_table(&[submission]);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("    ID  DATE"));
        assert!(lines[1].contains("Jane Doe"));
        assert!(lines[1].contains("Web Creation"));
        assert_eq!(lines[2], "Showing 1 submission");
    }

    #[test]
    fn test_parse_filter_rejects_unknown_status() {
        assert!(matches!(
            parse_filter(Some("deleted"), None),
            Err(CliError::InvalidArgument(_))
        ));
    }
}
