use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Change notification emitted by the [`GameEngine`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    StateChange(GameState),
    CellOpen(Cell),
    CellToggle(Cell),
    CellHighlight(Cell),
    CellClearHighlight(Cell),
}

impl GameEvent {
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::StateChange(_) => EventKind::StateChange,
            Self::CellOpen(_) => EventKind::CellOpen,
            Self::CellToggle(_) => EventKind::CellToggle,
            Self::CellHighlight(_) => EventKind::CellHighlight,
            Self::CellClearHighlight(_) => EventKind::CellClearHighlight,
        }
    }

    pub const fn cell(&self) -> Option<Cell> {
        match *self {
            Self::StateChange(_) => None,
            Self::CellOpen(cell)
            | Self::CellToggle(cell)
            | Self::CellHighlight(cell)
            | Self::CellClearHighlight(cell) => Some(cell),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    StateChange,
    CellOpen,
    CellToggle,
    CellHighlight,
    CellClearHighlight,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

type Listener = Box<dyn FnMut(&GameEvent)>;

struct Registration {
    id: ListenerId,
    // `None` receives every kind
    kind: Option<EventKind>,
    listener: Listener,
}

/// In-process publish/subscribe hub.
///
/// Listeners run synchronously, in registration order, on the thread that triggered the event.
/// The engine emits while it is mutably borrowed, so a listener can never call back into the
/// engine; state it needs to act on afterwards has to be shared out through e.g. an
/// `Rc<RefCell<_>>`.
#[derive(Default)]
pub struct Dispatcher {
    listeners: Vec<Registration>,
    next_id: u32,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&GameEvent) + 'static,
    ) -> ListenerId {
        self.register(Some(kind), Box::new(listener))
    }

    /// Registers a listener receiving events of every kind.
    pub fn add_global_listener(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> ListenerId {
        self.register(None, Box::new(listener))
    }

    pub fn on_state_change(&mut self, mut listener: impl FnMut(GameState) + 'static) -> ListenerId {
        self.add_listener(EventKind::StateChange, move |event| {
            if let GameEvent::StateChange(state) = *event {
                listener(state);
            }
        })
    }

    /// Registers a listener for one of the cell event kinds, receiving the cell payload.
    pub fn on_cell(
        &mut self,
        kind: EventKind,
        mut listener: impl FnMut(Cell) + 'static,
    ) -> ListenerId {
        if kind == EventKind::StateChange {
            log::warn!("cell listener registered for state changes will never fire");
        }
        self.add_listener(kind, move |event| {
            if let Some(cell) = event.cell() {
                listener(cell);
            }
        })
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|registration| registration.id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn dispatch(&mut self, event: GameEvent) {
        let kind = event.kind();
        for registration in &mut self.listeners {
            if registration.kind.is_none_or(|wanted| wanted == kind) {
                (registration.listener)(&event);
            }
        }
    }

    fn register(&mut self, kind: Option<EventKind>, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Registration { id, kind, listener });
        id
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn cell(row: Coord, column: Coord) -> Cell {
        Cell::new((row, column), CellType::Empty)
    }

    #[test]
    fn listeners_only_receive_their_kind() {
        let mut dispatcher = Dispatcher::new();
        let opened = Rc::new(RefCell::new(Vec::new()));
        let all = Rc::new(RefCell::new(Vec::new()));

        let sink = opened.clone();
        dispatcher.on_cell(EventKind::CellOpen, move |cell| sink.borrow_mut().push(cell));
        let sink = all.clone();
        dispatcher.add_global_listener(move |event| sink.borrow_mut().push(event.kind()));

        dispatcher.dispatch(GameEvent::CellOpen(cell(0, 0)));
        dispatcher.dispatch(GameEvent::CellToggle(cell(1, 1)));
        dispatcher.dispatch(GameEvent::StateChange(GameState::Start));

        assert_eq!(*opened.borrow(), vec![cell(0, 0)]);
        assert_eq!(
            *all.borrow(),
            vec![EventKind::CellOpen, EventKind::CellToggle, EventKind::StateChange]
        );
    }

    #[test]
    fn state_listener_gets_typed_payload() {
        let mut dispatcher = Dispatcher::new();
        let states = Rc::new(RefCell::new(Vec::new()));

        let sink = states.clone();
        dispatcher.on_state_change(move |state| sink.borrow_mut().push(state));
        dispatcher.dispatch(GameEvent::StateChange(GameState::Lost));

        assert_eq!(*states.borrow(), vec![GameState::Lost]);
    }

    #[test]
    fn removed_listener_stops_receiving() {
        let mut dispatcher = Dispatcher::new();
        let count = Rc::new(RefCell::new(0));

        let sink = count.clone();
        let id = dispatcher.add_listener(EventKind::CellOpen, move |_| *sink.borrow_mut() += 1);
        dispatcher.dispatch(GameEvent::CellOpen(cell(0, 0)));

        assert!(dispatcher.remove_listener(id));
        assert!(!dispatcher.remove_listener(id));
        dispatcher.dispatch(GameEvent::CellOpen(cell(0, 1)));

        assert_eq!(*count.borrow(), 1);
        assert_eq!(dispatcher.listener_count(), 0);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let mut dispatcher = Dispatcher::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let sink = order.clone();
            dispatcher.add_global_listener(move |_| sink.borrow_mut().push(tag));
        }
        dispatcher.dispatch(GameEvent::CellHighlight(cell(2, 2)));

        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }
}
