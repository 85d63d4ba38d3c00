use core::ops::BitOr;
use hashbrown::{HashMap, HashSet};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

use crate::*;

/// Valid transitions:
/// - Start -> Win
/// - Start -> Lost
/// - any -> Start, only through a fresh session
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// Session active and accepting input
    Start,
    /// Every cell required by the win policy is resolved
    Win,
    /// A mine was opened
    Lost,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Win | Self::Lost)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::Start
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum OpenOutcome {
    NoChange,
    Opened,
    HitMine,
    Won,
}

impl OpenOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Used to merge outcomes when opening several cells
impl BitOr for OpenOutcome {
    type Output = OpenOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use OpenOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Won, _) => Won,
            (_, Won) => Won,
            (Opened, _) => Opened,
            (_, Opened) => Opened,
            (NoChange, NoChange) => NoChange,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Toggled,
    Won,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Mutable interaction state of one game, from `start` until the next `start`.
#[derive(Clone, Debug)]
pub struct Session {
    config: GameConfig,
    field: Field,
    opened: HashSet<Coord2>,
    marked: HashMap<Coord2, bool>,
    highlighted: BTreeSet<Coord2>,
    state: GameState,
}

impl Session {
    fn new(config: GameConfig, field: Field) -> Self {
        Self {
            config,
            field,
            opened: HashSet::new(),
            marked: HashMap::new(),
            highlighted: BTreeSet::new(),
            state: GameState::Start,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn is_opened(&self, coords: Coord2) -> bool {
        self.opened.contains(&coords)
    }

    pub fn is_marked(&self, coords: Coord2) -> bool {
        self.marked.get(&coords).copied().unwrap_or(false)
    }

    pub fn is_highlighted(&self, coords: Coord2) -> bool {
        self.highlighted.contains(&coords)
    }

    pub fn highlighted(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.highlighted.iter().copied()
    }

    pub fn opened_count(&self) -> CellCount {
        self.opened.len().try_into().unwrap_or(CellCount::MAX)
    }

    pub fn marked_count(&self) -> CellCount {
        self.marked
            .values()
            .filter(|&&flag| flag)
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX)
    }

    /// How many mines have not been flagged yet, negative with excess flags
    pub fn mines_left(&self) -> isize {
        (self.field.mine_count() as isize) - (self.marked_count() as isize)
    }

    fn can_open(&self, coords: Coord2) -> bool {
        !self.is_opened(coords) && !self.is_marked(coords)
    }

    fn check_active(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }

    fn open_cell(&mut self, coords: Coord2, events: &mut Dispatcher) -> Result<OpenOutcome> {
        let coords = self.field.validate_coords(coords)?;
        self.check_active()?;

        if !self.can_open(coords) {
            return Ok(OpenOutcome::NoChange);
        }
        Ok(self.open_region(coords, events))
    }

    /// Opens `coords` and, if it is empty, flood-fills through connected empty cells.
    fn open_region(&mut self, coords: Coord2, events: &mut Dispatcher) -> OpenOutcome {
        let mut to_visit = VecDeque::from([coords]);

        while let Some(visit_coords) = to_visit.pop_front() {
            // skip flagged or already opened cells
            if !self.can_open(visit_coords) {
                continue;
            }

            match self.open_single(visit_coords, events) {
                CellType::Mine => {
                    log::debug!("mine opened at {:?}", visit_coords);
                    self.finish(GameState::Lost, events);
                    return OpenOutcome::HitMine;
                }
                CellType::Empty => {
                    to_visit.extend(
                        self.field
                            .iter_neighbors(visit_coords)
                            .filter(|&pos| self.can_open(pos)),
                    );
                    log::trace!("flood-fill from {:?}, queued: {}", visit_coords, to_visit.len());
                }
                CellType::Number(_) => {}
            }
        }

        if self.check_win(events) {
            OpenOutcome::Won
        } else {
            OpenOutcome::Opened
        }
    }

    fn open_single(&mut self, coords: Coord2, events: &mut Dispatcher) -> CellType {
        let cell = self.field.cell_unchecked(coords);
        self.opened.insert(coords);
        log::trace!("opened cell at {:?}: {:?}", coords, cell.kind);
        events.dispatch(GameEvent::CellOpen(cell));
        cell.kind
    }

    fn mark_cell(&mut self, coords: Coord2, events: &mut Dispatcher) -> Result<MarkOutcome> {
        let coords = self.field.validate_coords(coords)?;
        self.check_active()?;

        if self.is_opened(coords) {
            return Ok(MarkOutcome::NoChange);
        }

        let flag = self.marked.entry(coords).or_insert(false);
        *flag = !*flag;
        events.dispatch(GameEvent::CellToggle(self.field.cell_unchecked(coords)));

        Ok(if self.check_win(events) {
            MarkOutcome::Won
        } else {
            MarkOutcome::Toggled
        })
    }

    fn highlight_cell(&mut self, coords: Coord2, events: &mut Dispatcher) -> Result<usize> {
        let coords = self.field.validate_coords(coords)?;
        self.check_active()?;

        if !self.is_opened(coords) {
            return Ok(0);
        }
        let CellType::Number(count) = self.field[coords] else {
            return Ok(0);
        };

        let flagged = self
            .field
            .iter_neighbors(coords)
            .filter(|&pos| self.is_marked(pos))
            .count();
        if flagged != usize::from(count) {
            return Ok(0);
        }

        let mut highlighted = 0;
        for pos in self.field.iter_neighbors(coords) {
            if self.can_open(pos) && self.highlighted.insert(pos) {
                events.dispatch(GameEvent::CellHighlight(self.field.cell_unchecked(pos)));
                highlighted += 1;
            }
        }
        Ok(highlighted)
    }

    fn open_highlighted(&mut self, events: &mut Dispatcher) -> Result<OpenOutcome> {
        self.check_active()?;

        let targets: Vec<Coord2> = self.highlighted.iter().copied().collect();
        let mut outcome = OpenOutcome::NoChange;
        for coords in targets {
            if self.state.is_finished() {
                break;
            }
            if self.can_open(coords) {
                outcome = outcome | self.open_region(coords, events);
            }
        }
        Ok(outcome)
    }

    fn clear_highlight(&mut self, events: &mut Dispatcher) -> usize {
        let highlighted = core::mem::take(&mut self.highlighted);
        for &coords in &highlighted {
            events.dispatch(GameEvent::CellClearHighlight(self.field.cell_unchecked(coords)));
        }
        highlighted.len()
    }

    fn check_win(&mut self, events: &mut Dispatcher) -> bool {
        if self.state.is_finished() {
            return false;
        }

        let won = match self.config.win_policy {
            WinPolicy::OpenedSafeCells => self.opened_count() == self.field.safe_cell_count(),
            WinPolicy::ExactFlags => {
                let flags = self.marked_count();
                self.opened_count() + flags == self.field.total_cells()
                    && flags == self.field.mine_count()
            }
        };

        if won {
            self.finish(GameState::Win, events);
        }
        won
    }

    /// Reveals the whole board, then enters the terminal `state`. Runs at most once per session.
    fn finish(&mut self, state: GameState, events: &mut Dispatcher) {
        if self.state.is_finished() {
            return;
        }

        let mut revealed = 0;
        for coords in self.field.iter_coords() {
            if self.opened.insert(coords) {
                events.dispatch(GameEvent::CellOpen(self.field.cell_unchecked(coords)));
                revealed += 1;
            }
        }

        self.state = state;
        log::debug!("game ended: {:?}, {} cells revealed", state, revealed);
        events.dispatch(GameEvent::StateChange(state));
    }
}

/// Session lifecycle plus the open/flag/chord rules.
///
/// Every mutation is reported through the engine's [`Dispatcher`] before the call returns.
#[derive(Debug)]
pub struct GameEngine {
    rng: SmallRng,
    session: Option<Session>,
    dispatcher: Dispatcher,
}

impl GameEngine {
    /// Creates an engine without a session; `seed` drives the layout of every field it generates.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            session: None,
            dispatcher: Dispatcher::new(),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn state(&self) -> Option<GameState> {
        self.session.as_ref().map(Session::state)
    }

    /// Replaces any previous session with a freshly generated field.
    pub fn start(&mut self, config: GameConfig) -> Result<()> {
        let seed = self.rng.random();
        let field = RandomFieldGenerator::new(seed).generate(&config)?;
        self.begin(config, field);
        Ok(())
    }

    /// Replaces any previous session with a game on a known layout.
    pub fn start_with_field(&mut self, field: Field, win_policy: WinPolicy) -> Result<()> {
        let config = GameConfig::new(field.rows(), field.columns(), field.mine_count())
            .with_win_policy(win_policy);
        config.validate()?;
        self.begin(config, field);
        Ok(())
    }

    fn begin(&mut self, config: GameConfig, field: Field) {
        log::debug!(
            "starting {}x{} game with {} mines ({:?})",
            config.rows,
            config.columns,
            config.mines,
            config.win_policy
        );
        self.session = Some(Session::new(config, field));
        self.dispatcher
            .dispatch(GameEvent::StateChange(GameState::Start));
    }

    pub fn open_cell(&mut self, coords: Coord2) -> Result<OpenOutcome> {
        let session = self.session.as_mut().ok_or(GameError::NotStarted)?;
        session.open_cell(coords, &mut self.dispatcher)
    }

    /// Toggles the flag on an unopened cell
    pub fn mark_cell(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let session = self.session.as_mut().ok_or(GameError::NotStarted)?;
        session.mark_cell(coords, &mut self.dispatcher)
    }

    /// Chord preview: highlights the unopened, unflagged neighbours of an opened number cell
    /// whose flagged-neighbour count matches its number. Returns how many cells were highlighted.
    pub fn highlight_cell(&mut self, coords: Coord2) -> Result<usize> {
        let session = self.session.as_mut().ok_or(GameError::NotStarted)?;
        session.highlight_cell(coords, &mut self.dispatcher)
    }

    pub fn open_highlighted(&mut self) -> Result<OpenOutcome> {
        let session = self.session.as_mut().ok_or(GameError::NotStarted)?;
        session.open_highlighted(&mut self.dispatcher)
    }

    /// Drops every highlight, whatever the game state. Returns how many were cleared.
    pub fn clear_highlight(&mut self) -> Result<usize> {
        let session = self.session.as_mut().ok_or(GameError::NotStarted)?;
        Ok(session.clear_highlight(&mut self.dispatcher))
    }
}
