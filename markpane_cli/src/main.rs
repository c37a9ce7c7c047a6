//! Markpane - split-view markdown editor core, driven from the terminal.
//!
//! Usage: markpane [FILE]
//!
//! A headless harness for the search engine: type `/QUERY` to search,
//! `n`/`p` to navigate, `s` to toggle the scope, `c` to close search,
//! `q` to quit. The real shell wires the same session into its views.

use markpane_core::{
    EditorSession, ElementKind, FsStorage, MarkupNode, MarkupRenderer, MarkupTree, SearchOptions,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// Paragraph-per-block stand-in for the host's markdown renderer.
struct BlockRenderer;

impl MarkupRenderer for BlockRenderer {
    fn render(&self, text: &str) -> MarkupTree {
        let roots = text
            .split("\n\n")
            .filter(|block| !block.trim().is_empty())
            .map(|block| {
                MarkupNode::element(ElementKind::Paragraph, vec![MarkupNode::text(block)])
            })
            .collect();
        MarkupTree::new(roots)
    }
}

fn print_status(session: &mut EditorSession) {
    let state = session.search().state();
    let total = state.total_matches();
    println!("{} of {} for {:?}", state.cursor_index, total, state.query);
    if let Some(hit) = state.active_hit() {
        println!("  [{}..{}] ...{}...", hit.span.start, hit.span.end, hit.span.context);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Markpane");

    let args: Vec<String> = env::args().collect();
    let storage = FsStorage;
    let mut session = EditorSession::new(Box::new(BlockRenderer));

    if let Some(path) = args.get(1) {
        log::info!("Opening file: {}", path);
        session.open_document(&storage, Path::new(path));
        if session.buffer().is_empty() {
            log::warn!("{} is empty or could not be read", path);
        }
    }

    let mut options = SearchOptions::default();
    let stdin = io::stdin();
    print!("> ");
    let _ = io::stdout().flush();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                log::error!("stdin read failed: {}", err);
                break;
            }
        };
        let input = line.trim();

        match input {
            "q" => break,
            "o" => session.open_search(),
            "c" => {
                session.close_search();
                println!("search closed");
            }
            "n" => {
                session.next_match();
                print_status(&mut session);
            }
            "p" => {
                session.previous_match();
                print_status(&mut session);
            }
            "s" => {
                session.toggle_scope();
                println!("scope: {:?}", session.search().state().view_scope);
            }
            "case" | "word" | "regex" => {
                match input {
                    "case" => options.case_sensitive = !options.case_sensitive,
                    "word" => options.whole_word = !options.whole_word,
                    _ => options.use_regex = !options.use_regex,
                }
                session.search().set_options(options);
                session.run_search();
                print_status(&mut session);
            }
            query if query.starts_with('/') => {
                session.open_search();
                session.search_input(&query[1..], Instant::now());
                // Stand in for the host's timer wheel: wait out the quiet
                // period, then deliver the tick.
                std::thread::sleep(Duration::from_millis(300));
                session.tick(Instant::now());
                print_status(&mut session);
            }
            "" => {}
            other => println!("unknown command: {:?}", other),
        }

        print!("> ");
        let _ = io::stdout().flush();
    }

    log::info!("Markpane exited");
}
