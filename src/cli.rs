use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use candidate_scoring::{ShortlistMode, ShortlistStatus};

#[derive(Parser, Debug)]
#[command(
    name = "candidate-scoring",
    version,
    about = "Score candidates against a job and build a shortlist leaderboard"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a whole cohort and write the leaderboard JSON.
    Rank(RankArgs),
    /// Score one candidate by absolute thresholds and explain the result.
    Score(ScoreArgs),
    /// Read views over a leaderboard JSON written by `rank`.
    Query(QueryArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RankArgs {
    /// Job JSON: {job_id, job_title, skill_weights}.
    #[arg(long)]
    pub job: PathBuf,

    /// JSON array of candidates.
    #[arg(long)]
    pub candidates: PathBuf,

    /// Scoring TOML; falls back to $SCORING_CONFIG_PATH, then config/scoring.toml.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// percentile | absolute. Defaults to `shortlist.mode` from the config.
    #[arg(long)]
    pub mode: Option<ShortlistMode>,

    /// Write here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// Print Prometheus exposition text to stderr after the run.
    #[arg(long, default_value_t = false)]
    pub metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[arg(long)]
    pub job: PathBuf,

    /// Single candidate JSON object.
    #[arg(long)]
    pub candidate: PathBuf,

    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Leaderboard JSON produced by `rank`.
    #[arg(long)]
    pub leaderboard: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = false, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub view: QueryView,
}

#[derive(Subcommand, Debug, Clone)]
pub enum QueryView {
    /// Filtered, paginated entries.
    Page {
        /// pending | round_1 | round_2 | rejected
        #[arg(long)]
        status: Option<ShortlistStatus>,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Candidates placed in one round, with the shortlist rate.
    Shortlist {
        #[arg(long)]
        status: ShortlistStatus,
    },
    /// One candidate's leaderboard entry.
    Candidate {
        #[arg(long)]
        id: String,
    },
    /// Score distribution and consistency summary.
    Stats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_mode_is_optional() {
        let cli = Cli::parse_from([
            "candidate-scoring",
            "rank",
            "--job",
            "job.json",
            "--candidates",
            "cands.json",
        ]);
        match cli.command {
            Commands::Rank(args) => {
                assert_eq!(args.mode, None);
                assert!(!args.pretty);
                assert!(args.config.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn mode_flag_parses_library_mode() {
        let cli = Cli::parse_from([
            "candidate-scoring",
            "rank",
            "--job",
            "j.json",
            "--candidates",
            "c.json",
            "--mode",
            "Absolute",
            "--pretty",
        ]);
        let Commands::Rank(args) = cli.command else {
            panic!("expected rank");
        };
        assert_eq!(args.mode, Some(ShortlistMode::Absolute));
        assert!(args.pretty);

        let bad = Cli::try_parse_from([
            "candidate-scoring",
            "rank",
            "--job",
            "j.json",
            "--candidates",
            "c.json",
            "--mode",
            "ranked",
        ]);
        assert!(bad.is_err());
    }

    #[test]
    fn query_page_parses_status_and_paging() {
        let cli = Cli::parse_from([
            "candidate-scoring",
            "query",
            "--leaderboard",
            "lb.json",
            "page",
            "--status",
            "round_1",
            "--limit",
            "5",
            "--pretty",
        ]);
        let Commands::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert!(args.pretty);
        match args.view {
            QueryView::Page { status, offset, limit } => {
                assert_eq!(status, Some(ShortlistStatus::Round1));
                assert_eq!(offset, 0);
                assert_eq!(limit, Some(5));
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn query_shortlist_requires_status() {
        let missing = Cli::try_parse_from([
            "candidate-scoring",
            "query",
            "--leaderboard",
            "lb.json",
            "shortlist",
        ]);
        assert!(missing.is_err());
    }
}
