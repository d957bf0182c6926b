//! Change notification for map mutations.

use crossbeam_channel::Sender;
use serde::Serialize;

use crate::{
    geometry::{Direction, MapPos},
    landscape::PlayerId,
    objects::MapObject,
};

/// Receives every mutation made through [`crate::Map`]. Calls happen
/// synchronously inside the mutating method, in mutation order.
pub trait MapChangeHandler: Send + Sync {
    fn on_height_changed(&mut self, _pos: MapPos) {}

    fn on_object_changed(&mut self, _pos: MapPos, _old: MapObject, _new: MapObject) {}

    fn on_object_placed(&mut self, _pos: MapPos, _object: MapObject) {}

    fn on_object_exchanged(&mut self, _pos: MapPos, _old: MapObject, _new: MapObject) {}

    fn on_road_segment_placed(&mut self, _source: MapPos, _dirs: &[Direction]) {}

    fn on_road_segment_deleted(&mut self, _source: MapPos, _dirs: &[Direction]) {}

    fn on_owner_changed(&mut self, _pos: MapPos, _owner: Option<PlayerId>) {}
}

/// Token returned on registration, used to remove the handler again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(pub(crate) u32);

/// Owned form of a change, for consumers that are not on the mutating thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MapChange {
    Height(MapPos),
    ObjectChanged {
        pos: MapPos,
        old: MapObject,
        new: MapObject,
    },
    ObjectPlaced {
        pos: MapPos,
        object: MapObject,
    },
    ObjectExchanged {
        pos: MapPos,
        old: MapObject,
        new: MapObject,
    },
    RoadPlaced {
        source: MapPos,
        dirs: Vec<Direction>,
    },
    RoadDeleted {
        source: MapPos,
        dirs: Vec<Direction>,
    },
    Owner {
        pos: MapPos,
        owner: Option<PlayerId>,
    },
}

/// Forwards every change over a channel. A disconnected receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelChangeHandler {
    sender: Sender<MapChange>,
}

impl ChannelChangeHandler {
    pub fn new(sender: Sender<MapChange>) -> Self {
        Self { sender }
    }

    fn send(&self, change: MapChange) {
        if self.sender.send(change).is_err() {
            tracing::trace!(target: "hexmap::map", "map.change_channel.disconnected");
        }
    }
}

impl MapChangeHandler for ChannelChangeHandler {
    fn on_height_changed(&mut self, pos: MapPos) {
        self.send(MapChange::Height(pos));
    }

    fn on_object_changed(&mut self, pos: MapPos, old: MapObject, new: MapObject) {
        self.send(MapChange::ObjectChanged { pos, old, new });
    }

    fn on_object_placed(&mut self, pos: MapPos, object: MapObject) {
        self.send(MapChange::ObjectPlaced { pos, object });
    }

    fn on_object_exchanged(&mut self, pos: MapPos, old: MapObject, new: MapObject) {
        self.send(MapChange::ObjectExchanged { pos, old, new });
    }

    fn on_road_segment_placed(&mut self, source: MapPos, dirs: &[Direction]) {
        self.send(MapChange::RoadPlaced {
            source,
            dirs: dirs.to_vec(),
        });
    }

    fn on_road_segment_deleted(&mut self, source: MapPos, dirs: &[Direction]) {
        self.send(MapChange::RoadDeleted {
            source,
            dirs: dirs.to_vec(),
        });
    }

    fn on_owner_changed(&mut self, pos: MapPos, owner: Option<PlayerId>) {
        self.send(MapChange::Owner { pos, owner });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MapGeometry;

    #[test]
    fn forwards_owned_changes() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut handler = ChannelChangeHandler::new(tx);
        let pos = MapGeometry::from_dimensions(8, 8).expect("grid").pos(5, 0);
        handler.on_road_segment_placed(pos, &[Direction::Right, Direction::Down]);
        handler.on_owner_changed(pos, Some(1));
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec![
                MapChange::RoadPlaced {
                    source: pos,
                    dirs: vec![Direction::Right, Direction::Down],
                },
                MapChange::Owner {
                    pos,
                    owner: Some(1),
                },
            ]
        );
    }

    #[test]
    fn dropped_receiver_is_ignored() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        let mut handler = ChannelChangeHandler::new(tx);
        handler.on_height_changed(MapGeometry::from_dimensions(8, 8).expect("grid").pos(0, 0));
    }
}
