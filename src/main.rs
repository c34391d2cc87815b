use clap::Parser;
use log::debug;
use std::error::Error;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

use recipe_search::{
    load_config_from, ApplyOutcome, EmptyQueryPolicy, FetchStatus, QueryController, RecipeSearch,
    SearchError,
};

/// Search recipes by keyword. Each line typed on stdin is submitted as a new query.
#[derive(Parser, Debug)]
#[command(name = "recipe-search", version, about)]
struct Args {
    /// Query searched at start-up (default: from config, else "chicken")
    #[arg(short, long)]
    query: Option<String>,

    /// Path to a TOML config file (default: ./config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Application id for the recipe API
    #[arg(long)]
    app_id: Option<String>,

    /// Application key for the recipe API
    #[arg(long)]
    app_key: Option<String>,

    /// Base URL of the recipe API
    #[arg(long)]
    base_url: Option<String>,

    /// Send empty queries to the API instead of rejecting them
    #[arg(long)]
    allow_empty: bool,

    /// Run the start-up search, print it and exit
    #[arg(long)]
    once: bool,

    /// Print rows as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut config = load_config_from(args.config.as_deref())?;
    if let Some(query) = args.query {
        config.default_query = query;
    }
    if let Some(app_id) = args.app_id {
        config.app_id = Some(app_id);
    }
    if let Some(app_key) = args.app_key {
        config.app_key = Some(app_key);
    }
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if args.allow_empty {
        config.empty_query = EmptyQueryPolicy::Forward;
    }
    debug!("Using {} with timeout {}s", config.base_url, config.timeout);

    let controller = RecipeSearch::builder().config(config).build()?;
    let json = args.json;

    if args.once {
        let outcome = controller.start().await?;
        return print_outcome(&controller, &outcome, json);
    }

    let input = BufReader::new(tokio::io::stdin());
    run_session(&controller, input, |controller, outcome| {
        print_outcome(controller, outcome, json)
    })
    .await
}

/// Run the start-up search, then submit every input line as a query
///
/// Input keeps being read while fetches are outstanding; `on_outcome` is called
/// as each fetch completes, in completion order. Returns once input is exhausted
/// and every fetch has finished.
async fn run_session<R, F>(
    controller: &QueryController,
    input: R,
    mut on_outcome: F,
) -> Result<(), Box<dyn Error>>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(&QueryController, &ApplyOutcome) -> Result<(), Box<dyn Error>>,
{
    let mut fetches = JoinSet::new();
    fetches.spawn(controller.start());

    let mut lines = input.lines();
    let mut reading = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if reading => match line? {
                Some(line) => submit_line(controller, line, &mut fetches)?,
                None => reading = false,
            },
            Some(joined) = fetches.join_next() => {
                let outcome = joined??;
                on_outcome(controller, &outcome)?;
            }
            else => break,
        }
    }

    Ok(())
}

type FetchSet = JoinSet<Result<ApplyOutcome, tokio::task::JoinError>>;

fn submit_line(
    controller: &QueryController,
    line: String,
    fetches: &mut FetchSet,
) -> Result<(), SearchError> {
    controller.set_draft(line);
    match controller.submit() {
        Ok(Some(fetch)) => {
            fetches.spawn(fetch);
        }
        Ok(None) => match controller.status() {
            FetchStatus::Failed { error, .. } => eprintln!(
                "Search for {:?} failed: {}",
                controller.committed_query(),
                error
            ),
            FetchStatus::Pending { .. } => {
                println!("Still searching for {:?}", controller.committed_query())
            }
            _ => println!(
                "Already showing results for {:?}",
                controller.committed_query()
            ),
        },
        Err(SearchError::EmptyQuery) => eprintln!("Type something to search for"),
        Err(e) => return Err(e),
    }
    Ok(())
}

fn print_outcome(
    controller: &QueryController,
    outcome: &ApplyOutcome,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    match outcome {
        ApplyOutcome::Applied { .. } => {
            let rows = controller.rows();
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                println!("No recipes found for {:?}", controller.committed_query());
            } else {
                for row in rows {
                    println!("{}", row);
                }
            }
        }
        ApplyOutcome::Failed { .. } => {
            if let FetchStatus::Failed { error, .. } = controller.status() {
                eprintln!("Search failed: {}", error);
            }
        }
        ApplyOutcome::Discarded { seq, latest } => {
            eprintln!("Ignoring results of search #{}, #{} is newer", seq, latest)
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use recipe_search::{RecipeSource, RecipeSummary};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::sync::oneshot;

    type SearchResult = Result<Vec<RecipeSummary>, SearchError>;

    #[derive(Default)]
    struct GatedSource {
        gates: Mutex<HashMap<String, oneshot::Receiver<SearchResult>>>,
    }

    impl GatedSource {
        fn gate(&self, query: &str) -> oneshot::Sender<SearchResult> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(query.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl RecipeSource for GatedSource {
        async fn search(&self, query: &str) -> SearchResult {
            let gate = self.gates.lock().unwrap().remove(query).unwrap();
            gate.await.unwrap()
        }
    }

    fn recipe(label: &str) -> RecipeSummary {
        RecipeSummary {
            label: label.to_string(),
            calories: 400.0,
            image: String::new(),
            ingredients: Vec::new(),
            uri: None,
        }
    }

    fn controller(source: &Arc<GatedSource>) -> QueryController {
        RecipeSearch::builder()
            .source(source.clone())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_lines_are_read_while_fetch_is_pending() {
        let source = Arc::new(GatedSource::default());
        let controller = controller(&source);

        source.gate("chicken").send(Ok(Vec::new())).unwrap();
        let mut beef_gate = Some(source.gate("beef"));
        source
            .gate("tofu")
            .send(Ok(vec![recipe("Tofu Scramble")]))
            .unwrap();

        // "beef" is only answered once "tofu" has been applied, so both lines
        // must have been submitted while "beef" was still in flight.
        let mut outcomes = Vec::new();
        run_session(&controller, &b"beef\ntofu\n"[..], |_, outcome| {
            if let ApplyOutcome::Applied { seq: 3, .. } = outcome {
                if let Some(gate) = beef_gate.take() {
                    let _ = gate.send(Ok(vec![recipe("Beef Stew")]));
                }
            }
            outcomes.push(outcome.clone());
            Ok(())
        })
        .await
        .unwrap();

        assert!(outcomes.contains(&ApplyOutcome::Applied { seq: 3, count: 1 }));
        assert!(outcomes.contains(&ApplyOutcome::Discarded { seq: 2, latest: 3 }));
        assert_eq!(controller.rows()[0].title, "Tofu Scramble");
    }

    #[tokio::test]
    async fn test_session_ends_when_input_and_fetches_are_done() {
        let source = Arc::new(GatedSource::default());
        let controller = controller(&source);
        source.gate("chicken").send(Ok(vec![recipe("Chicken Pie")])).unwrap();

        let mut outcomes = Vec::new();
        run_session(&controller, &b"\nchicken\n"[..], |_, outcome| {
            outcomes.push(outcome.clone());
            Ok(())
        })
        .await
        .unwrap();

        // The empty line is rejected and "chicken" is unchanged, so only the
        // start-up fetch runs.
        assert_eq!(outcomes, vec![ApplyOutcome::Applied { seq: 1, count: 1 }]);
    }
}
