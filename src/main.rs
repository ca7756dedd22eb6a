//! Memory Match entry point
//!
//! Native builds run a small terminal front end: one session, commands
//! from stdin, the session clock driven by wall time between commands.

#[cfg(not(target_arch = "wasm32"))]
mod terminal {
    use std::io::{self, BufRead, Write};
    use std::time::{Duration, Instant};

    use memory_match::persistence::{FileStore, SessionStore};
    use memory_match::sim::{Board, CardState};
    use memory_match::{GameError, GameEvent, GamePhase, GameSession, Result, Settings};

    const HELP: &str = "commands: <index> | wait <secs> | save | load | reset | new [rows cols [seed]] | show | help | quit";

    /// Session plus the wall clock that drives it
    struct Game {
        session: GameSession,
        last_tick: Instant,
    }

    impl Game {
        fn new(session: GameSession) -> Self {
            Self {
                session,
                last_tick: Instant::now(),
            }
        }

        /// Run deferred work for the wall time since the last call
        fn catch_up(&mut self) {
            let now = Instant::now();
            self.session.advance(now - self.last_tick);
            self.last_tick = now;
        }

        /// Handle one command line. Returns false on quit.
        fn command(&mut self, line: &str) -> Result<bool> {
            let mut words = line.split_whitespace();
            let Some(cmd) = words.next() else {
                return Ok(true);
            };

            match cmd {
                "quit" | "q" => return Ok(false),
                "help" | "?" => println!("{HELP}"),
                "show" => {}
                "save" => self.session.save_game()?,
                "load" => match self.session.load_game() {
                    Err(GameError::NotFound) => println!("no saved game"),
                    other => other?,
                },
                "reset" => self.session.reset_progress()?,
                "wait" => {
                    let secs: f32 = words.next().and_then(|w| w.parse().ok()).unwrap_or(1.0);
                    self.session
                        .advance(Duration::try_from_secs_f32(secs).unwrap_or(Duration::ZERO));
                }
                "new" => {
                    let settings = self.session.settings();
                    let defaults = (settings.default_rows, settings.default_cols);
                    let (rows, cols, seed) = new_game_args(words, defaults);
                    if let Err(e) = self.session.setup_game(rows, cols, seed) {
                        println!("{e}");
                    }
                }
                _ => match cmd.parse::<usize>() {
                    Ok(index) => {
                        self.session.select(index);
                    }
                    Err(_) => println!("{HELP}"),
                },
            }
            Ok(true)
        }

        fn print(&self) {
            let Some(board) = self.session.board() else {
                return;
            };
            let preview = self.session.phase() == GamePhase::Preview;
            print_board(board, preview);
            println!(
                "pairs {}/{}  moves {}  score {}  combo {}",
                self.session.pairs_found(),
                self.session.total_pairs(),
                self.session.moves(),
                self.session.score(),
                self.session.combo()
            );
        }
    }

    /// `[rows cols [seed]]`; a missing or out-of-range size falls back to `defaults`
    fn new_game_args<'a>(
        mut words: impl Iterator<Item = &'a str>,
        defaults: (u32, u32),
    ) -> (u32, u32, Option<u64>) {
        let rows = words.next().map(str::parse::<u32>);
        let cols = words.next().map(str::parse::<u32>);
        let seed = words.next().and_then(|w| w.parse::<u64>().ok());
        let (rows, cols) = match (rows, cols) {
            (Some(Ok(r)), Some(Ok(c))) => (r, c),
            _ => defaults,
        };
        (rows, cols, seed)
    }

    /// Face-down cards show their index, visible ones their face in brackets
    fn print_board(board: &Board, preview: bool) {
        for row in board.cards().chunks(board.cols() as usize) {
            let line: Vec<String> = row
                .iter()
                .map(|card| match card.state() {
                    CardState::FaceDown if preview => format!("({:>3})", card.face.0),
                    CardState::FaceDown => format!(" {:>3} ", card.index),
                    CardState::FaceUp => format!("[{:>3}]", card.face.0),
                    CardState::Matched => format!("<{:>3}>", card.face.0),
                    CardState::Removed => "     ".to_string(),
                })
                .collect();
            println!("{}", line.join(" "));
        }
    }

    fn describe(event: &GameEvent) -> Option<String> {
        Some(match event {
            GameEvent::GameStart {
                pairs_found,
                total_pairs,
                moves,
            } => format!("game start: {pairs_found}/{total_pairs} pairs, {moves} moves"),
            GameEvent::TilesMatch {
                pairs_found,
                total_pairs,
            } => format!("match! {pairs_found}/{total_pairs}"),
            GameEvent::TilesMismatch { .. } => "no match".to_string(),
            GameEvent::ComboHit { combo } => format!("combo x{combo}"),
            GameEvent::LevelFinished => "level clear!".to_string(),
            GameEvent::PreviewFinished => "go!".to_string(),
            _ => return None,
        })
    }

    pub fn run() -> Result<()> {
        let dir = std::env::var("MEMORY_MATCH_SAVE_DIR").unwrap_or_else(|_| ".memory-match".into());
        let store = FileStore::new(dir)?;
        let settings = Settings::load(&store);
        let (rows, cols) = (settings.default_rows, settings.default_cols);

        let mut session = GameSession::new(settings, SessionStore::new(Box::new(store)));
        session.subscribe(|event| {
            if let Some(text) = describe(event) {
                println!("  {text}");
            }
        });

        if let Err(e) = session.load_game() {
            if !matches!(e, GameError::NotFound) {
                log::warn!("Starting fresh: {}", e);
            }
            session.setup_game(rows, cols, None)?;
        }

        println!("{HELP}");
        let mut game = Game::new(session);
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            game.catch_up();
            game.print();
            print!("> ");
            io::stdout().flush()?;

            let Some(line) = lines.next() else { break };
            let line = line?;
            game.catch_up();
            match game.command(&line) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => println!("{e}"),
            }
        }

        // Suspend: keep the game for next time
        game.session.save_game()?;
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Memory Match starting...");

    if let Err(e) = terminal::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser front end drives the library directly
}
