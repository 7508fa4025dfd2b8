use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use unicode_width::UnicodeWidthStr;

use tabtab_core::completion::{
    CompletionBackend, CompletionError, CompletionGateway, OllamaBackend,
};
use tabtab_core::settings::{self, Settings};
use tabtab_core::{match_candidates, Candidate, CandidateOrigin, PinyinDictionary};
use tabtab_session::{CandidateAction, InputSession, KeyEvent, KeyResponse};

const DEMO_DICT: &str = include_str!("../data/demo.dict");

#[derive(Parser)]
#[command(name = "tabtab", about = "TabTab engine diagnostics")]
struct Cli {
    /// Path to a dictionary file (built-in demo lexicon if omitted)
    #[arg(long, global = true)]
    dict: Option<PathBuf>,

    /// Path to a settings TOML (embedded defaults if omitted)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Exact and prefix dictionary lookup for a reading
    Lookup {
        /// Pinyin reading (spaces allowed, e.g. "ni hao")
        reading: String,
        /// Maximum prefix continuations to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Ranked matcher output for a phonetic buffer
    Match {
        /// Raw phonetic buffer as typed, e.g. "nihoa"
        buffer: String,
    },

    /// Drive a session from a key script against a virtual clock
    Simulate {
        /// Path to the script file (stdin if omitted)
        script: Option<PathBuf>,
        /// Answer completion requests locally instead of calling the service
        #[arg(long)]
        no_ai: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(path) = &cli.settings {
        let toml = fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Failed to read settings {}: {}", path.display(), e);
            process::exit(1);
        });
        settings::init_custom(toml).unwrap_or_else(|e| {
            eprintln!("Invalid settings {}: {}", path.display(), e);
            process::exit(1);
        });
    }
    let settings = settings::settings();

    let dict = load_dict(cli.dict.as_deref());

    match cli.command {
        Command::Lookup { reading, limit } => run_lookup(&dict, &reading, limit),
        Command::Match { buffer } => run_match(&dict, &buffer, settings),
        Command::Simulate { script, no_ai } => {
            run_simulate(dict, script.as_deref(), no_ai, settings)
        }
    }
}

fn load_dict(path: Option<&std::path::Path>) -> Arc<PinyinDictionary> {
    let dict = match path {
        Some(path) => PinyinDictionary::load(path).unwrap_or_else(|e| {
            eprintln!("Failed to load dictionary {}: {}", path.display(), e);
            process::exit(1);
        }),
        None => PinyinDictionary::from_str_strict(DEMO_DICT)
            .expect("embedded demo dictionary must parse"),
    };
    Arc::new(dict)
}

fn run_lookup(dict: &PinyinDictionary, reading: &str, limit: usize) {
    let key: String = reading.split_whitespace().collect::<String>().to_lowercase();

    let exact = dict.lookup_exact(&key);
    if exact.is_empty() {
        println!("{key}: no exact entries");
    } else {
        println!("{key}:");
        for entry in exact {
            println!("  {}\t{}", entry.text, entry.weight);
        }
    }

    let continuations = dict.lookup_prefix(&key, limit);
    if !continuations.is_empty() {
        println!("continuations:");
        for (cont, entries) in continuations {
            let words: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
            println!("  {}\t{}", cont, words.join(" "));
        }
    }
}

fn run_match(dict: &PinyinDictionary, buffer: &str, settings: &Settings) {
    let candidates = match_candidates(dict, buffer, &settings.matcher);
    if candidates.is_empty() {
        println!("no candidates for {buffer:?}");
        return;
    }
    print_candidates(&candidates, 0);
}

fn origin_tag(origin: CandidateOrigin) -> &'static str {
    match origin {
        CandidateOrigin::DictionaryExact => "exact",
        CandidateOrigin::DictionaryFuzzy => "fuzzy",
        CandidateOrigin::AiCompletion => "ai",
    }
}

fn print_candidates(candidates: &[Candidate], selected: usize) {
    let text_width = candidates
        .iter()
        .map(|c| c.text.width())
        .max()
        .unwrap_or(0);
    for (i, c) in candidates.iter().enumerate() {
        let marker = if i == selected { '>' } else { ' ' };
        let pad = text_width - c.text.width();
        println!(
            "  {marker} {}. {}{:pad$}  [{}]",
            i + 1,
            c.text,
            "",
            origin_tag(c.origin),
        );
    }
}

/// Stand-in backend for offline runs: echoes a fixed, valid reply.
struct CannedBackend;

impl CompletionBackend for CannedBackend {
    fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        Ok(r#"["吗", "了", "呢"]"#.to_string())
    }
}

fn run_simulate(
    dict: Arc<PinyinDictionary>,
    script: Option<&std::path::Path>,
    no_ai: bool,
    settings: &Settings,
) {
    let text = match script {
        Some(path) => fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Failed to read script {}: {}", path.display(), e);
            process::exit(1);
        }),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).unwrap_or_else(|e| {
                eprintln!("Failed to read script from stdin: {}", e);
                process::exit(1);
            });
            buf
        }
    };

    let max_chars = settings.completion.max_chars;
    let gateway = if no_ai {
        CompletionGateway::new(CannedBackend, max_chars)
    } else {
        CompletionGateway::new(OllamaBackend::new(&settings.completion), max_chars)
    };

    let mut session = InputSession::new(dict, settings.clone());
    let mut now: u64 = 0;
    let mut in_flight = false;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        println!("[{now:>6}ms] {line}");

        let mut fields = line.split_whitespace();
        let verb = fields.next().unwrap_or_default();
        let arg = fields.next();

        match (verb, arg) {
            ("type", Some(text)) => {
                for ch in text.chars() {
                    now += 1;
                    let resp = session.handle_key(char_event(ch), now);
                    apply(&mut session, &gateway, resp, &mut in_flight);
                }
            }
            ("confirm", None) => {
                now += 1;
                let resp = session.handle_key(KeyEvent::Confirm, now);
                apply(&mut session, &gateway, resp, &mut in_flight);
            }
            ("space", None) => {
                now += 1;
                let resp = session.handle_key(KeyEvent::Space, now);
                apply(&mut session, &gateway, resp, &mut in_flight);
            }
            ("enter", None) => {
                now += 1;
                let resp = session.handle_key(KeyEvent::Enter, now);
                apply(&mut session, &gateway, resp, &mut in_flight);
            }
            ("backspace", None) => {
                now += 1;
                let resp = session.handle_key(KeyEvent::Backspace, now);
                apply(&mut session, &gateway, resp, &mut in_flight);
            }
            ("up", None) => {
                now += 1;
                let resp = session.handle_key(KeyEvent::ArrowUp, now);
                apply(&mut session, &gateway, resp, &mut in_flight);
            }
            ("down", None) => {
                now += 1;
                let resp = session.handle_key(KeyEvent::ArrowDown, now);
                apply(&mut session, &gateway, resp, &mut in_flight);
            }
            ("digit", Some(n)) => {
                let n: u8 = n.parse().unwrap_or_else(|_| {
                    eprintln!("Script line {}: digit wants 1-9, got {:?}", idx + 1, n);
                    process::exit(1);
                });
                now += 1;
                let resp = session.handle_key(KeyEvent::Digit(n), now);
                apply(&mut session, &gateway, resp, &mut in_flight);
            }
            ("esc", None) => {
                now += 1;
                let resp = session.handle_key(KeyEvent::Escape, now);
                apply(&mut session, &gateway, resp, &mut in_flight);
            }
            ("scene", Some(tag)) => {
                session.set_scene(tag);
            }
            ("wait", Some(ms)) => {
                let ms: u64 = ms.parse().unwrap_or_else(|_| {
                    eprintln!("Script line {}: wait wants milliseconds, got {:?}", idx + 1, ms);
                    process::exit(1);
                });
                now += ms;
                if let Some(resp) = session.tick(now) {
                    apply(&mut session, &gateway, resp, &mut in_flight);
                }
                poll_gateway(&mut session, &gateway, &mut in_flight, ms);
            }
            _ => {
                eprintln!("Script line {}: unknown command {:?}", idx + 1, line);
                process::exit(1);
            }
        }
    }

    // Let an in-flight round land before the transcript ends.
    poll_gateway(&mut session, &gateway, &mut in_flight, 1000);
}

fn char_event(ch: char) -> KeyEvent {
    match ch {
        '1'..='9' => KeyEvent::Digit(ch as u8 - b'0'),
        c if c.is_ascii_alphabetic() => KeyEvent::Char(c),
        c => KeyEvent::Other(c),
    }
}

/// Render a response and route its side effects to the gateway.
fn apply(
    session: &mut InputSession,
    gateway: &CompletionGateway,
    resp: KeyResponse,
    in_flight: &mut bool,
) {
    gateway.invalidate(session.generation());

    if !resp.consumed {
        println!("    passthrough");
    }
    if let Some(text) = &resp.commit {
        println!("    commit {text:?}");
    }
    match &resp.candidates {
        CandidateAction::Show {
            candidates,
            selected,
        } => print_candidates(candidates, *selected),
        CandidateAction::Hide => println!("    panel hidden"),
        CandidateAction::Keep => {}
    }
    if let Some(request) = resp.completion_request {
        println!("    ai request (buffer {:?})", request.buffer);
        gateway.submit(request);
        *in_flight = true;
    }
}

/// Poll for completion outcomes, waiting in real time only while a round is
/// actually in flight.
fn poll_gateway(
    session: &mut InputSession,
    gateway: &CompletionGateway,
    in_flight: &mut bool,
    budget_ms: u64,
) {
    let deadline = Instant::now() + Duration::from_millis(budget_ms.min(2000));
    loop {
        if let Some(outcome) = gateway.try_recv() {
            *in_flight = false;
            if let Some(resp) = session.receive_completions(&outcome) {
                println!("    ai completions arrived");
                if let CandidateAction::Show {
                    candidates,
                    selected,
                } = &resp.candidates
                {
                    print_candidates(candidates, *selected);
                }
            } else {
                println!("    ai completions discarded (stale)");
            }
            return;
        }
        if !*in_flight || Instant::now() >= deadline {
            return;
        }
        thread::sleep(Duration::from_millis(20));
    }
}
