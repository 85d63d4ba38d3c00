use ndarray::Array2;
use sapper_core::*;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// What the player currently sees in a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Glyph {
    Hidden,
    Flagged,
    Highlighted,
    Open(CellType),
}

impl Glyph {
    const fn symbol(self) -> char {
        match self {
            Self::Hidden => '#',
            Self::Flagged => 'F',
            Self::Highlighted => 'o',
            Self::Open(CellType::Empty) => '.',
            Self::Open(CellType::Mine) => '*',
            Self::Open(CellType::Number(count)) => (b'0' + count) as char,
        }
    }
}

impl Default for Glyph {
    fn default() -> Self {
        Self::Hidden
    }
}

/// Board as rebuilt purely from engine events.
#[derive(Clone, Debug)]
pub(crate) struct BoardView {
    glyphs: Array2<Glyph>,
    state: Option<GameState>,
}

impl BoardView {
    pub(crate) fn new(size: Coord2) -> Self {
        Self {
            glyphs: Array2::default(size.to_nd_index()),
            state: None,
        }
    }

    /// Forget the previous board; must run before the engine starts a session of `size`.
    pub(crate) fn reset(&mut self, size: Coord2) {
        *self = Self::new(size);
    }

    /// Subscribes `view` to every event of `dispatcher`.
    pub(crate) fn attach(view: &Rc<RefCell<Self>>, dispatcher: &mut Dispatcher) -> ListenerId {
        let view = Rc::clone(view);
        dispatcher.add_global_listener(move |event| view.borrow_mut().apply(event))
    }

    pub(crate) fn apply(&mut self, event: &GameEvent) {
        use GameEvent::*;

        if let StateChange(state) = *event {
            self.state = Some(state);
            return;
        }
        let Some(cell) = event.cell() else {
            return;
        };
        let Some(glyph) = self.glyphs.get_mut(cell.coords().to_nd_index()) else {
            log::warn!("event for cell outside the view: {:?}", cell);
            return;
        };

        *glyph = match (*event, *glyph) {
            (CellOpen(cell), _) => Glyph::Open(cell.kind),
            (CellToggle(_), Glyph::Hidden | Glyph::Highlighted) => Glyph::Flagged,
            (CellToggle(_), Glyph::Flagged) => Glyph::Hidden,
            (CellHighlight(_), Glyph::Hidden) => Glyph::Highlighted,
            (CellClearHighlight(_), Glyph::Highlighted) => Glyph::Hidden,
            (_, unchanged) => unchanged,
        };
    }

    pub(crate) fn state(&self) -> Option<GameState> {
        self.state
    }
}

impl fmt::Display for BoardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, columns) = self.glyphs.dim();

        write!(f, "   ")?;
        for column in 0..columns {
            write!(f, "{:>3}", column)?;
        }
        writeln!(f)?;

        for row in 0..rows {
            write!(f, "{:>3}", row)?;
            for column in 0..columns {
                write!(f, "{:>3}", self.glyphs[[row, column]].symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
