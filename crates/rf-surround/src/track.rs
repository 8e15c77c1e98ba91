//! Tracks contributing to the surround bus

use rf_core::ChannelBuffers;

use crate::send::SurroundSend;

pub type TrackId = u32;

/// A track with its block buffer and optional surround send
#[derive(Debug)]
pub struct Track {
    id: TrackId,
    name: String,
    order_key: u32,
    active: bool,
    buffers: ChannelBuffers,
    surround_send: Option<SurroundSend>,
}

impl Track {
    pub fn new(id: TrackId, name: &str, channels: usize, block_size: usize) -> Self {
        Self {
            id,
            name: name.to_string(),
            order_key: id,
            active: true,
            buffers: ChannelBuffers::new(channels, block_size),
            surround_send: None,
        }
    }

    pub fn with_send(mut self, send: SurroundSend) -> Self {
        self.surround_send = Some(send);
        self
    }

    pub fn with_order_key(mut self, order_key: u32) -> Self {
        self.order_key = order_key;
        self
    }

    #[inline]
    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Presentation position; lower keys are walked first
    #[inline]
    pub fn order_key(&self) -> u32 {
        self.order_key
    }

    #[inline]
    pub fn active(&self) -> bool {
        self.active
    }

    pub fn n_channels(&self) -> usize {
        self.buffers.n_channels()
    }

    /// Block buffer: fill before processing, holds the thru output after
    pub fn buffers(&self) -> &ChannelBuffers {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut ChannelBuffers {
        &mut self.buffers
    }

    pub fn surround_send(&self) -> Option<&SurroundSend> {
        self.surround_send.as_ref()
    }

    pub fn surround_send_mut(&mut self) -> Option<&mut SurroundSend> {
        self.surround_send.as_mut()
    }

    /// Non-real-time: resize the block buffer and the send
    pub fn set_block_size(&mut self, frames: usize) {
        let channels = self.buffers.n_channels();
        self.buffers.ensure(channels, frames);
        if let Some(send) = self.surround_send.as_mut() {
            send.set_block_size(frames);
        }
    }

    /// Run the send on this block
    pub fn process(&mut self, start: u64, end: u64, nframes: usize) {
        if !self.active {
            return;
        }
        if let Some(send) = self.surround_send.as_mut() {
            send.run(&mut self.buffers, start, end, nframes);
        }
    }
}

/// Ordered track container with a topology generation counter
#[derive(Debug, Default)]
pub struct TrackList {
    tracks: Vec<Track>,
    generation: u64,
    next_id: TrackId,
}

impl TrackList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next added track should use
    pub fn next_id(&mut self) -> TrackId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add(&mut self, track: Track) {
        self.next_id = self.next_id.max(track.id + 1);
        self.tracks.push(track);
        self.bump();
    }

    pub fn remove(&mut self, id: TrackId) -> Option<Track> {
        let idx = self.tracks.iter().position(|t| t.id == id)?;
        self.bump();
        Some(self.tracks.remove(idx))
    }

    pub fn set_order_key(&mut self, id: TrackId, order_key: u32) -> bool {
        let Some(track) = self.tracks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if track.order_key != order_key {
            track.order_key = order_key;
            self.bump();
        }
        true
    }

    pub fn set_active(&mut self, id: TrackId, active: bool) -> bool {
        let Some(track) = self.tracks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if track.active != active {
            track.active = active;
            self.bump();
        }
        true
    }

    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Track> {
        self.tracks.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Bumped on every add/remove/reorder/activation change
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_bumps_on_topology_change() {
        let mut list = TrackList::new();
        let g0 = list.generation();

        let a = list.next_id();
        list.add(Track::new(a, "a", 2, 64));
        let b = list.next_id();
        list.add(Track::new(b, "b", 1, 64));
        assert_eq!(list.generation(), g0 + 2);

        assert!(list.set_order_key(a, 10));
        assert!(!list.set_order_key(99, 1));
        let g = list.generation();
        list.set_order_key(a, 10);
        assert_eq!(list.generation(), g);

        list.set_active(b, false);
        assert!(!list.get(b).unwrap().active());
        assert!(list.remove(a).is_some());
        assert_eq!(list.len(), 1);
        assert_eq!(list.generation(), g + 2);
    }

    #[test]
    fn test_next_id_skips_added() {
        let mut list = TrackList::new();
        list.add(Track::new(7, "seven", 1, 16));
        assert_eq!(list.next_id(), 8);
        assert_eq!(list.get(7).map(Track::order_key), Some(7));
    }
}
