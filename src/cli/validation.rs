use crate::cli::args::CliArgs;
use crate::output::OutputFormat;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(page) = args.page {
        if page == 0 {
            return Err("invalid page, expected positive integer".to_string());
        }
    }
    if let Some(per_page) = args.per_page {
        if per_page == 0 {
            return Err("invalid per-page, expected positive integer".to_string());
        }
    }
    if let Some(raw) = args.output_format.as_deref() {
        OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid --format '{raw}', expected text, json or html"))?;
    }
    if let Some(raw) = args.url.as_deref() {
        crate::client::Endpoints::new(raw).map_err(|e| format!("invalid --url: {e}"))?;
    }
    if let Some(source) = args.source.as_deref() {
        if source.trim().is_empty() {
            return Err("invalid source, expected a tag or 'all'".to_string());
        }
    }
    if args.ask.is_some() && args.interactive {
        return Err(
            "--ask cannot be combined with --interactive (use '? QUERY' inside the session)"
                .to_string(),
        );
    }
    Ok(())
}
