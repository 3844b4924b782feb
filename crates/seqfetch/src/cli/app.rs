use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Clone, Debug, Parser)]
#[command(name = "seqfetch", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct App {
    /// File the fragments are joined into. Must not exist yet.
    pub output: PathBuf,

    /// URL of the directory holding the fragments.
    pub base_url: String,

    /// Fragment filename with one `%d` (or `%0Nd`) placeholder.
    #[arg(short, long, env = "SEQFETCH_TEMPLATE")]
    pub template: Option<String>,

    /// Size of the first probe window.
    #[arg(short = 's', long, env = "SEQFETCH_INITIAL_STEP")]
    pub initial_step: Option<u64>,

    /// Upper bound on ranges fetched at the same time.
    #[arg(short = 'j', long, env = "SEQFETCH_MAX_IN_FLIGHT")]
    pub max_in_flight: Option<usize>,

    /// Proxy URL; `https://` proxies carry HTTPS traffic.
    #[arg(long = "proxy", env = "SEQFETCH_PROXY", value_delimiter = ',')]
    pub proxies: Vec<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "SEQFETCH_TIMEOUT")]
    pub timeout: Option<u64>,

    #[arg(long, env = "SEQFETCH_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Extra request header as `Name:Value`.
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Keep the downloaded fragments next to the output.
    #[arg(long)]
    pub keep_fragments: bool,

    /// TOML settings file; flags and environment take precedence.
    #[arg(short, long, env = "SEQFETCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output (-v, -vv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("expected `Name:Value`, got `{s}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in `{s}`"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Referer: https://a.example/x").unwrap(),
            ("Referer".to_string(), "https://a.example/x".to_string())
        );
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header(" :value").is_err());
    }

    #[test]
    fn test_positional_and_repeated_flags() {
        let app = App::try_parse_from([
            "seqfetch",
            "-vv",
            "--proxy",
            "http://p1:8080",
            "--proxy",
            "https://p2:8443",
            "-H",
            "A:1",
            "-H",
            "B:2",
            "out.ts",
            "https://cdn.example/live",
        ])
        .unwrap();

        assert_eq!(app.output, PathBuf::from("out.ts"));
        assert_eq!(app.base_url, "https://cdn.example/live");
        assert_eq!(app.verbose, 2);
        assert_eq!(app.proxies.len(), 2);
        assert_eq!(app.headers[1], ("B".to_string(), "2".to_string()));
        assert!(!app.keep_fragments);
    }

    #[test]
    fn test_missing_base_url_is_rejected() {
        assert!(App::try_parse_from(["seqfetch", "out.ts"]).is_err());
    }
}
