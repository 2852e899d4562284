use std::{
    io::{self, Write as _},
    sync::Arc,
};

use rand::rngs::StdRng;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};

use crate::{
    api::ReviewApi,
    list::ListController,
    post::ReviewDecision,
    review::SubmitOutcome,
    session::Session,
};

const SNIPPET_CHARS: usize = 48;

//==============================================================================
// Commands
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Approve(usize),
    Reject(usize),
    Open(usize),
    Next,
    Prev,
    Last,
    Reload,
    Show,
    Help,
    Quit,
}

/// Parse one input line. `None` means the line is not a command; indexes are
/// 1-based as displayed.
pub fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let command = match parts.next()? {
        "approve" | "a" => Command::Approve(parse_index(parts.next())?),
        "reject" | "r" => Command::Reject(parse_index(parts.next())?),
        "open" | "o" => Command::Open(parse_index(parts.next())?),
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "last" | "l" => Command::Last,
        "reload" => Command::Reload,
        "show" | "s" => Command::Show,
        "help" | "h" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ => return None,
    };
    Some(command)
}

fn parse_index(arg: Option<&str>) -> Option<usize> {
    arg?.parse().ok().filter(|index| *index >= 1)
}

//==============================================================================
// Console
//==============================================================================

/// Interactive review surface: renders the current page and turns stdin
/// lines into list navigation and per-item decisions.
pub struct Console<A> {
    api: Arc<A>,
    list: ListController<A>,
    session: Session,
    rng: StdRng,
    page_error: Option<String>,
}

impl<A: ReviewApi + Send + Sync + 'static> Console<A> {
    pub fn new(api: Arc<A>, list: ListController<A>, session: Session, rng: StdRng) -> Self {
        Self {
            api,
            list,
            session,
            rng,
            page_error: None,
        }
    }

    pub async fn run(&mut self, start_page: u32) {
        self.load(start_page).await;
        self.render();

        let mut lines = BufReader::new(stdin()).lines();
        loop {
            print!("> ");
            io::stdout().flush().ok();

            let Ok(Some(line)) = lines.next_line().await else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some(command) = parse_command(line) else {
                println!("Unknown command, type `help` for the command list.");
                continue;
            };
            if command == Command::Quit {
                break;
            }
            self.execute(command).await;
        }
    }

    async fn execute(&mut self, command: Command) {
        match command {
            Command::Approve(index) => self.submit(index, ReviewDecision::Approved).await,
            Command::Reject(index) => self.submit(index, ReviewDecision::Rejected).await,
            Command::Open(index) => self.open(index),
            Command::Next => {
                if self.list.page().has_next() {
                    let target = self.list.page().current() + 1;
                    self.load(target).await;
                    self.render();
                } else {
                    println!("Already on the last page.");
                }
            }
            Command::Prev => {
                if self.list.page().has_prev() {
                    let target = self.list.page().current() - 1;
                    self.load(target).await;
                    self.render();
                } else {
                    println!("Already on the first page.");
                }
            }
            Command::Last => {
                if self.list.page().has_next() {
                    let target = self.list.page().total_pages();
                    self.load(target).await;
                    self.render();
                } else {
                    println!("Already on the last page.");
                }
            }
            Command::Reload => {
                let current = self.list.page().current();
                self.load(current).await;
                self.render();
            }
            Command::Show => self.render(),
            Command::Help => print_help(),
            Command::Quit => unreachable!("handled by the input loop"),
        }
    }

    async fn load(&mut self, page: u32) {
        println!("Loading videos...");
        self.page_error = None;
        if let Err(err) = self.list.change_page(page, &mut self.rng).await {
            self.page_error = Some(err.to_string());
        }
    }

    async fn submit(&mut self, index: usize, decision: ReviewDecision) {
        let api = Arc::clone(&self.api);
        let Some(item) = self.list.item_mut(index) else {
            println!("No item {index} on this page.");
            return;
        };
        if !item.editable() {
            println!(
                "Item {index} is already {}, decisions are final.",
                item.decision().label()
            );
            return;
        }

        println!("Submitting review...");
        match item.submit(api.as_ref(), decision).await {
            SubmitOutcome::Committed(decision) => {
                println!("Item {index} {}.", decision.label());
                self.render();
            }
            SubmitOutcome::Retryable => {
                println!("Submission did not go through, item {index} stays pending.");
            }
            SubmitOutcome::Ignored => {}
        }
    }

    fn open(&self, index: usize) {
        let Some(item) = self.list.item(index) else {
            println!("No item {index} on this page.");
            return;
        };
        match item.playable_url() {
            Some(url) => {
                println!("+----------------- video -----------------+");
                println!("  streaming {url}");
                println!("+-----------------------------------------+");
            }
            None => println!("No video URL available."),
        }
    }

    fn render(&self) {
        println!();
        if let Some(err) = &self.page_error {
            println!("Error: {err}");
            println!("Use `reload` to try again.");
            return;
        }

        let page = self.list.page();
        println!(
            "Unreviewed videos: {}   Logged in as: {}",
            page.total_items(),
            self.session.username
        );

        if self.list.items().is_empty() {
            println!("No reviewable videos on this page.");
        } else {
            for (index, item) in self.list.items().iter().enumerate() {
                let status = match item.submitting() {
                    true => "submitting",
                    false => item.decision().label(),
                };
                println!(
                    "{:>2}. [{status}] {} by {}  {}",
                    index + 1,
                    item.post().id,
                    item.post().creator_id,
                    snippet(&item.post().content),
                );
            }
        }

        let total_pages = page.total_pages().max(1);
        let mut nav = Vec::new();
        if page.has_prev() {
            nav.push("prev");
        }
        if page.has_next() {
            nav.push("next");
            nav.push("last");
        }
        nav.push("reload");
        println!(
            "Page {} of {total_pages}   ({})",
            page.current(),
            nav.join("/")
        );
    }
}

fn print_help() {
    println!("Commands:");
    println!("  approve <n> | a <n>   approve item n");
    println!("  reject <n>  | r <n>   reject item n");
    println!("  open <n>    | o <n>   show the playable video URL of item n");
    println!("  next | prev | last    navigate pages");
    println!("  reload                refetch the current page");
    println!("  show | s              redraw the page");
    println!("  quit | q              leave the console");
}

fn snippet(content: &str) -> String {
    let mut short: String = content.chars().take(SNIPPET_CHARS).collect();
    if content.chars().count() > SNIPPET_CHARS {
        short.push_str("...");
    }
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_with_long_and_short_forms() {
        assert_eq!(parse_command("approve 2"), Some(Command::Approve(2)));
        assert_eq!(parse_command("a 2"), Some(Command::Approve(2)));
        assert_eq!(parse_command("reject 10"), Some(Command::Reject(10)));
        assert_eq!(parse_command("r 1"), Some(Command::Reject(1)));
        assert_eq!(parse_command("o 3"), Some(Command::Open(3)));
        assert_eq!(parse_command("next"), Some(Command::Next));
        assert_eq!(parse_command("p"), Some(Command::Prev));
        assert_eq!(parse_command("last"), Some(Command::Last));
        assert_eq!(parse_command("reload"), Some(Command::Reload));
        assert_eq!(parse_command("s"), Some(Command::Show));
        assert_eq!(parse_command("q"), Some(Command::Quit));
        assert_eq!(parse_command("exit"), Some(Command::Quit));
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert_eq!(parse_command("approve"), None);
        assert_eq!(parse_command("a zero"), None);
        assert_eq!(parse_command("a 0"), None);
        assert_eq!(parse_command("frobnicate"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn snippets_are_bounded_and_marked() {
        assert_eq!(snippet("short"), "short");
        let long = "x".repeat(60);
        let short = snippet(&long);
        assert_eq!(short.chars().count(), SNIPPET_CHARS + 3);
        assert!(short.ends_with("..."));
    }
}
