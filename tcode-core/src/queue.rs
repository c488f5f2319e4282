//! Ordered, deduplicated command queue.
//!
//! Holds at most one command per [`CommandKey`]. Enqueuing a command for a
//! key that is already present evicts the old entry and appends the new one,
//! so queue order is "most recently updated last".

use heapless::Vec;
use tcode_proto::{Command, CommandKey};

/// Default queue capacity: one slot per (type, channel) pair.
pub const MAX_COMMANDS: usize = tcode_proto::KEY_COUNT;

/// No free slot for another command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueFull;

impl core::fmt::Display for QueueFull {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "command queue full")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for QueueFull {}

#[derive(Debug, Clone, Default)]
pub struct CommandQueue<const Q: usize = MAX_COMMANDS> {
    entries: Vec<Command, Q>,
}

impl<const Q: usize> CommandQueue<Q> {
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Replace any command with the same key, then append `cmd`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueFull`] when the key is new and every slot is taken. The
    /// queue is unchanged in that case.
    pub fn enqueue(&mut self, cmd: Command) -> Result<(), QueueFull> {
        if let Some(index) = self.position(cmd.key()) {
            self.entries.remove(index);
        }
        self.entries.push(cmd).map_err(|_| QueueFull)
    }

    /// Enqueue every entry into `into`, in order, with the same dedup rule.
    ///
    /// # Errors
    ///
    /// Returns [`QueueFull`] if `into` cannot take every new key. Nothing is
    /// written in that case.
    pub fn copy_all<const R: usize>(&self, into: &mut CommandQueue<R>) -> Result<(), QueueFull> {
        let new_keys = self
            .entries
            .iter()
            .filter(|cmd| !into.contains(cmd.key()))
            .count();
        if into.len() + new_keys > into.capacity() {
            return Err(QueueFull);
        }

        for cmd in &self.entries {
            into.enqueue(*cmd)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove and return the entry at `index`, or `None` if out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<Command> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Visit every entry in order with its index.
    pub fn for_each<F: FnMut(usize, &mut Command)>(&mut self, mut visitor: F) {
        for (index, cmd) in self.entries.iter_mut().enumerate() {
            visitor(index, cmd);
        }
    }

    pub fn get(&self, key: CommandKey) -> Option<&Command> {
        self.entries.iter().find(|cmd| cmd.key() == key)
    }

    pub(crate) fn get_at_mut(&mut self, index: usize) -> Option<&mut Command> {
        self.entries.get_mut(index)
    }

    #[inline]
    pub fn contains(&self, key: CommandKey) -> bool {
        self.position(key).is_some()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Command> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        Q
    }

    fn position(&self, key: CommandKey) -> Option<usize> {
        self.entries.iter().position(|cmd| cmd.key() == key)
    }
}

impl<'a, const Q: usize> IntoIterator for &'a CommandQueue<Q> {
    type Item = &'a Command;
    type IntoIter = core::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;
    use tcode_proto::{decode, CommandType};

    fn key(kind: CommandType, channel: u8) -> CommandKey {
        CommandKey::new(kind, channel)
    }

    #[test]
    fn test_enqueue_dedups_by_key() {
        let mut queue: CommandQueue = CommandQueue::new();
        queue.enqueue(decode(b"L090").unwrap()).unwrap();
        queue.enqueue(decode(b"L010").unwrap()).unwrap();

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.get(key(CommandType::Linear, 0)), Some(&decode(b"L010").unwrap()));
    }

    #[test]
    fn test_enqueue_moves_replaced_key_to_back() {
        let mut queue: CommandQueue = CommandQueue::new();
        queue.enqueue(decode(b"L090").unwrap()).unwrap();
        queue.enqueue(decode(b"V150").unwrap()).unwrap();
        queue.enqueue(decode(b"L010").unwrap()).unwrap();

        let kinds: Vec<CommandType> = queue.iter().map(|cmd| cmd.kind).collect();
        assert_eq!(kinds, [CommandType::Vibrate, CommandType::Linear]);
    }

    #[test]
    fn test_channels_are_distinct_keys() {
        let mut queue: CommandQueue = CommandQueue::new();
        queue.enqueue(decode(b"L090").unwrap()).unwrap();
        queue.enqueue(decode(b"L190").unwrap()).unwrap();
        queue.enqueue(decode(b"R090").unwrap()).unwrap();
        assert_eq!(queue.len(), 3);
        assert!(queue.contains(key(CommandType::Linear, 1)));
        assert!(!queue.contains(key(CommandType::Linear, 2)));
    }

    #[test]
    fn test_full_queue_rejects_new_key_only() {
        let mut queue: CommandQueue<2> = CommandQueue::new();
        queue.enqueue(decode(b"L090").unwrap()).unwrap();
        queue.enqueue(decode(b"L190").unwrap()).unwrap();

        assert_eq!(queue.enqueue(decode(b"L290").unwrap()), Err(QueueFull));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.enqueue(decode(b"L050").unwrap()), Ok(()));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_default_capacity_covers_every_key() {
        let mut queue: CommandQueue = CommandQueue::new();
        for kind in CommandType::ALL {
            for channel in 0..=tcode_proto::MAX_CHANNEL {
                let mut cmd = decode(b"L050").unwrap();
                cmd.kind = kind;
                cmd.channel = channel;
                queue.enqueue(cmd).unwrap();
            }
        }
        assert_eq!(queue.len(), MAX_COMMANDS);
    }

    #[test]
    fn test_copy_all_merges_with_dedup() {
        let mut staged: CommandQueue = CommandQueue::new();
        staged.enqueue(decode(b"L010").unwrap()).unwrap();
        staged.enqueue(decode(b"V1S50").unwrap()).unwrap();

        let mut active: CommandQueue = CommandQueue::new();
        active.enqueue(decode(b"L090").unwrap()).unwrap();
        active.enqueue(decode(b"R050").unwrap()).unwrap();

        staged.copy_all(&mut active).unwrap();
        assert_eq!(active.len(), 3);
        assert_eq!(staged.len(), 2);

        let order: Vec<CommandKey> = active.iter().map(Command::key).collect();
        assert_eq!(
            order,
            [
                key(CommandType::Rotate, 0),
                key(CommandType::Linear, 0),
                key(CommandType::Vibrate, 1),
            ]
        );
    }

    #[test]
    fn test_copy_all_is_atomic_on_overflow() {
        let mut staged: CommandQueue = CommandQueue::new();
        staged.enqueue(decode(b"L010").unwrap()).unwrap();
        staged.enqueue(decode(b"L110").unwrap()).unwrap();

        let mut active: CommandQueue<2> = CommandQueue::new();
        active.enqueue(decode(b"R090").unwrap()).unwrap();

        assert_eq!(staged.copy_all(&mut active), Err(QueueFull));
        assert_eq!(active.len(), 1);
        assert!(active.contains(key(CommandType::Rotate, 0)));
    }

    #[test]
    fn test_remove_at() {
        let mut queue: CommandQueue = CommandQueue::new();
        queue.enqueue(decode(b"L090").unwrap()).unwrap();
        queue.enqueue(decode(b"V190").unwrap()).unwrap();

        assert_eq!(queue.remove_at(5), None);
        let removed = queue.remove_at(0).unwrap();
        assert_eq!(removed.kind, CommandType::Linear);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_for_each_visits_in_order() {
        let mut queue: CommandQueue = CommandQueue::new();
        queue.enqueue(decode(b"L090").unwrap()).unwrap();
        queue.enqueue(decode(b"V190").unwrap()).unwrap();

        let mut visited = 0;
        queue.for_each(|index, cmd| {
            assert_eq!(index, visited);
            cmd.magnitude = 0.0;
            visited += 1;
        });
        assert_eq!(visited, 2);
        assert!(queue.iter().all(|cmd| cmd.magnitude == 0.0));

        queue.clear();
        assert!(queue.is_empty());
    }
}
