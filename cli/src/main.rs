use anyhow::Context;
use clap::{Parser, ValueEnum};
use sapper_core::*;
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use command::{Command, HELP};
use view::BoardView;

mod command;
mod view;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Win once every safe cell is open
    Opened,
    /// Win once every cell is open or flagged and the flags match the mine count
    Flags,
}

impl From<PolicyArg> for WinPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Opened => WinPolicy::OpenedSafeCells,
            PolicyArg::Flags => WinPolicy::ExactFlags,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Minesweeper in the terminal", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::WarnLevel>,

    /// Field rows, clamped to 9..=20
    #[arg(short, long)]
    rows: Option<u32>,

    /// Field columns, clamped to 9..=20
    #[arg(short, long)]
    columns: Option<u32>,

    /// Mine count, clamped to 2 and half the cells
    #[arg(short, long)]
    mines: Option<u32>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = PolicyArg::Opened)]
    win_policy: PolicyArg,

    /// Directory holding the results file
    #[arg(long, default_value = ".")]
    results_dir: PathBuf,
}

fn format_for_counter(num: isize) -> String {
    match num {
        ..-99 => "-99".to_string(),
        -99..0 => format!("-{:02}", -num),
        0..1000 => format!("{:03}", num),
        1000.. => "999".to_string(),
    }
}

struct App {
    engine: GameEngine,
    view: Rc<RefCell<BoardView>>,
    stopwatch: Stopwatch,
    config: GameConfig,
    store: JsonFileStore,
    ended: bool,
}

impl App {
    fn new(args: &Args) -> Self {
        let config = Limits::DEFAULT
            .sanitize(args.rows, args.columns, args.mines)
            .with_win_policy(args.win_policy.into());
        let seed = args.seed.unwrap_or_else(rand::random);
        log::debug!("seed: {}", seed);

        let mut engine = GameEngine::new(seed);
        let view = Rc::new(RefCell::new(BoardView::new(config.size())));
        BoardView::attach(&view, engine.dispatcher_mut());

        Self {
            engine,
            view,
            stopwatch: Stopwatch::new(),
            config,
            store: JsonFileStore::new(&args.results_dir),
            ended: false,
        }
    }

    fn new_game(&mut self) -> anyhow::Result<()> {
        self.view.borrow_mut().reset(self.config.size());
        self.engine
            .start(self.config)
            .context("could not start a new game")?;
        self.stopwatch.reset();
        self.ended = false;
        Ok(())
    }

    fn execute(&mut self, command: Command) -> anyhow::Result<()> {
        use Command::*;

        match command {
            Open(coords) => {
                self.first_move();
                self.engine.open_cell(coords)?;
            }
            Flag(coords) => {
                self.first_move();
                self.engine.mark_cell(coords)?;
            }
            Chord(coords) => {
                let chord = self.engine.highlight_cell(coords).and_then(|highlighted| {
                    if highlighted > 0 {
                        self.engine.open_highlighted()
                    } else {
                        Ok(OpenOutcome::NoChange)
                    }
                });
                // the highlight never outlives the gesture
                self.engine.clear_highlight()?;
                chord?;
            }
            NewGame => self.new_game()?,
            Results => {
                print_results(&self.store.load()?);
                return Ok(());
            }
            Help => {
                println!("{}", HELP);
                return Ok(());
            }
            Quit => return Ok(()),
        }

        self.check_ended()?;
        self.print_board();
        Ok(())
    }

    fn first_move(&mut self) {
        if !self.stopwatch.is_started() && !self.ended {
            self.stopwatch.start();
        }
    }

    fn check_ended(&mut self) -> anyhow::Result<()> {
        let state = self.view.borrow().state();
        let Some(state) = state.filter(|state| state.is_finished()) else {
            return Ok(());
        };
        if self.ended {
            return Ok(());
        }
        self.ended = true;
        self.stopwatch.stop();

        let secs = self.stopwatch.elapsed_secs();
        log::info!("game ended: {:?} after {}s", state, secs);
        if state == GameState::Win {
            println!("You WIN in {}", format_clock(secs));
            let table = self.store.append(secs)?;
            print_results(&table);
        } else {
            println!("You LOSE");
        }
        println!("type `n` for a new game");
        Ok(())
    }

    fn print_board(&self) {
        let mines_left = self
            .engine
            .session()
            .map_or(self.config.mines as isize, Session::mines_left);
        println!(
            "mines {}   time {}",
            format_for_counter(mines_left),
            format_clock(self.stopwatch.elapsed_secs())
        );
        print!("{}", self.view.borrow());
    }
}

fn print_results(table: &ResultsTable) {
    if table.is_empty() {
        println!("no results yet");
        return;
    }
    for (rank, entry) in table.ranked().iter().enumerate() {
        let date = chrono::DateTime::from_timestamp_millis(entry.result.date)
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "?".to_string());
        let marker = if entry.current { "  <- this game" } else { "" };
        println!(
            "{:>3}. {}  {}{}",
            rank + 1,
            format_clock(entry.result.time),
            date,
            marker
        );
    }
}

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let mut app = App::new(&args);
    app.new_game()?;
    println!("{}", HELP);
    app.print_board();
    prompt()?;

    for line in io::stdin().lock().lines() {
        let line = line.context("could not read input")?;
        if line.trim().is_empty() {
            prompt()?;
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => {
                if let Err(err) = app.execute(command) {
                    println!("{:#}", err);
                }
            }
            Err(err) => println!("{:#}", err),
        }
        prompt()?;
    }

    Ok(())
}
