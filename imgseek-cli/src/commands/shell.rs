//! Interactive search session.
//!
//! One dashboard lives for the whole session, so pagination and selection
//! carry over between commands.

use std::io::Write;

use anyhow::{Context as _, Result};
use colored::Colorize;
use imgseek_core::{Dashboard, FetchOutcome, HISTORY_VIEW_LEN};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::commands::history::GUEST_HISTORY_NOTE;
use crate::utils::{print_history, print_results, print_top_searches, Context};

const HELP: &str = "\
Commands:
  search <term>, s <term>   New search
  next, n                   Load the next page
  type <text>               Edit the query without searching
  go                        Search for the edited query
  select <id|#>             Toggle selection of an image
  selected                  List selected images
  clear-selection           Deselect everything
  results                   Show loaded images
  history                   Show recent searches
  clear-history             Clear search history
  top                       Show top searches
  whoami                    Show the current session
  logout                    Sign out and leave
  help                      Show this help
  quit, exit                Leave";

enum Step {
    Continue,
    Quit,
}

struct Shell<'a> {
    ctx: &'a Context,
    dashboard: Dashboard,
    pending_clears: Vec<JoinHandle<()>>,
}

pub async fn execute(ctx: &Context) -> Result<()> {
    let mut dashboard = ctx.open(None).await?;
    ctx.flush_notifications(&mut dashboard);

    let mut shell = Shell {
        ctx,
        dashboard,
        pending_clears: Vec::new(),
    };

    if !ctx.quiet {
        println!(
            "Signed in as {} ({}). Type {} for commands.",
            shell.dashboard.session().display_name().bold(),
            shell.dashboard.session().mode,
            "help".cyan()
        );
        shell.summary();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(ctx.quiet)?;
        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let step = shell.dispatch(line.trim()).await?;
        shell.ctx.flush_notifications(&mut shell.dashboard);
        if matches!(step, Step::Quit) {
            break;
        }
    }

    for handle in shell.pending_clears.drain(..) {
        if let Err(e) = handle.await {
            debug!(error = %e, "History clear task did not finish");
        }
    }
    Ok(())
}

fn prompt(quiet: bool) -> Result<()> {
    if !quiet {
        print!("{} ", "imgseek>".bold());
        std::io::stdout().flush()?;
    }
    Ok(())
}

impl Shell<'_> {
    async fn dispatch(&mut self, line: &str) -> Result<Step> {
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        debug!(command, arg, "Shell command");

        match command {
            "" => {}
            "search" | "s" => {
                if arg.is_empty() {
                    println!("Usage: search <term>");
                } else {
                    let outcome = self.dashboard.search(arg).await;
                    self.report(outcome);
                }
            }
            "next" | "n" => {
                if !self.dashboard.controller().has_more() {
                    println!("No more results.");
                } else {
                    let outcome = self.dashboard.next_page().await;
                    self.report(outcome);
                }
            }
            "type" => {
                self.dashboard.controller_mut().set_query_text(arg);
            }
            "go" => {
                let outcome = self.dashboard.submit_query().await;
                if outcome.is_none() {
                    println!("Nothing to search for; use `type <text>` first.");
                }
                self.report(outcome);
            }
            "select" => self.toggle(arg),
            "selected" => {
                let selection = self.dashboard.selection();
                if selection.is_empty() {
                    println!("Nothing selected.");
                } else {
                    for id in selection.sorted() {
                        println!("   {id}");
                    }
                }
            }
            "clear-selection" => {
                self.dashboard.clear_selection();
                println!("Selection cleared.");
            }
            "results" => {
                print_results(self.dashboard.results().records(), self.dashboard.selection());
            }
            "history" => {
                if !self.dashboard.session().mode.is_authenticated() {
                    println!("{GUEST_HISTORY_NOTE}");
                } else if self.dashboard.history().is_empty() {
                    println!("No searches yet.");
                } else {
                    print_history(self.dashboard.history().recent(HISTORY_VIEW_LEN));
                }
            }
            "clear-history" => match self.dashboard.clear_history() {
                Some(handle) => {
                    self.pending_clears.push(handle);
                    println!("History cleared.");
                }
                None => println!("{GUEST_HISTORY_NOTE}"),
            },
            "top" => {
                let terms = self.dashboard.top_searches();
                if terms.is_empty() {
                    println!("No top searches available.");
                } else {
                    print_top_searches(terms);
                }
            }
            "whoami" => {
                let session = self.dashboard.session();
                println!("{} ({})", session.display_name(), session.mode);
            }
            "logout" => {
                if self.dashboard.sign_out().await? {
                    return Ok(Step::Quit);
                }
            }
            "help" | "?" => println!("{HELP}"),
            "quit" | "exit" | "q" => return Ok(Step::Quit),
            other => println!("Unknown command: {other}. Type `help` for commands."),
        }
        Ok(Step::Continue)
    }

    fn toggle(&mut self, arg: &str) {
        if arg.is_empty() {
            println!("Usage: select <id|#>");
            return;
        }
        // A number picks by position in the result list.
        let id = match arg.parse::<usize>() {
            Ok(n) => match n
                .checked_sub(1)
                .and_then(|i| self.dashboard.results().records().get(i))
            {
                Some(record) => record.id.clone(),
                None => {
                    println!("No image #{n}.");
                    return;
                }
            },
            Err(_) => arg.to_string(),
        };

        if self.dashboard.toggle_selection(&id) {
            println!("Selected {id}");
        } else {
            println!("Deselected {id}");
        }
    }

    fn report(&self, outcome: Option<FetchOutcome>) {
        match outcome {
            Some(FetchOutcome::Applied { received, .. }) => {
                println!("Loaded {received} images.");
                self.summary();
            }
            Some(FetchOutcome::Failed) | Some(FetchOutcome::Stale) | None => {}
        }
    }

    fn summary(&self) {
        let controller = self.dashboard.controller();
        println!(
            "{} images for \"{}\", page {}{}",
            self.dashboard.results().len(),
            controller.committed_term().unwrap_or("-"),
            controller.page(),
            if controller.has_more() { ", more available" } else { "" }
        );
    }
}
