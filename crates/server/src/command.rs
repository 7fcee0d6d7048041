//! Command queue shared between network handlers and the simulation.
//!
//! Any number of producers push directional commands through a
//! `CommandSender`; the simulation owns the `CommandQueue` and drains
//! everything pending once per tick, in arrival order.

use protocol::Direction;
use tokio::sync::mpsc;

/// A directional paddle command. Arrival order is the queue position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub direction: Direction,
}

impl Command {
    pub const fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

impl From<Direction> for Command {
    fn from(direction: Direction) -> Self {
        Self::new(direction)
    }
}

/// Create a linked producer handle and consumer queue.
pub fn command_queue() -> (CommandSender, CommandQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CommandSender { tx }, CommandQueue { rx })
}

/// Producer side. Cheap to clone; one per connection.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: mpsc::UnboundedSender<Command>,
}

impl CommandSender {
    /// Append a command to the tail. Returns false once the simulation is gone.
    pub fn enqueue(&self, command: impl Into<Command>) -> bool {
        self.tx.send(command.into()).is_ok()
    }
}

/// Consumer side, owned by the simulation engine.
#[derive(Debug)]
pub struct CommandQueue {
    rx: mpsc::UnboundedReceiver<Command>,
}

impl CommandQueue {
    /// Take every pending command in FIFO order, leaving the queue empty.
    pub fn drain_all(&mut self) -> Vec<Command> {
        let mut drained = Vec::with_capacity(self.rx.len());
        while let Ok(command) = self.rx.try_recv() {
            drained.push(command);
        }
        drained
    }

    /// Drop everything pending. Returns how many commands were discarded.
    pub fn clear(&mut self) -> usize {
        let mut count = 0;
        while self.rx.try_recv().is_ok() {
            count += 1;
        }
        count
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_is_fifo_and_empties() {
        let (sender, mut queue) = command_queue();
        sender.enqueue(Direction::Left);
        sender.enqueue(Direction::Left);
        sender.enqueue(Direction::Right);
        assert_eq!(queue.len(), 3);

        let drained: Vec<Direction> = queue.drain_all().into_iter().map(|c| c.direction).collect();
        assert_eq!(drained, vec![Direction::Left, Direction::Left, Direction::Right]);
        assert!(queue.is_empty());
        assert!(queue.drain_all().is_empty());
    }

    #[test]
    fn test_clear() {
        let (sender, mut queue) = command_queue();
        sender.enqueue(Direction::Right);
        sender.enqueue(Direction::Right);
        assert_eq!(queue.clear(), 2);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_enqueue_after_consumer_dropped() {
        let (sender, queue) = command_queue();
        assert!(sender.enqueue(Direction::Left));
        drop(queue);
        assert!(!sender.enqueue(Direction::Left));
    }

    #[test]
    fn test_concurrent_enqueue_keeps_every_command_once() {
        const PRODUCERS: usize = 8;
        const PER_PRODUCER: usize = 500;

        let (sender, mut queue) = command_queue();
        let handles: Vec<_> = (0..PRODUCERS)
            .map(|i| {
                let sender = sender.clone();
                std::thread::spawn(move || {
                    let direction = if i % 2 == 0 { Direction::Left } else { Direction::Right };
                    for _ in 0..PER_PRODUCER {
                        sender.enqueue(direction);
                    }
                })
            })
            .collect();

        // Drain concurrently with the producers.
        let mut drained = Vec::new();
        while handles.iter().any(|h| !h.is_finished()) {
            drained.extend(queue.drain_all());
        }
        for handle in handles {
            handle.join().unwrap();
        }
        drained.extend(queue.drain_all());

        assert_eq!(drained.len(), PRODUCERS * PER_PRODUCER);
        let lefts = drained.iter().filter(|c| c.direction == Direction::Left).count();
        assert_eq!(lefts, PRODUCERS / 2 * PER_PRODUCER);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_single_producer_order_survives_concurrent_drain() {
        let (sender, mut queue) = command_queue();
        let producer = std::thread::spawn(move || {
            for i in 0..1000 {
                let direction = if i % 3 == 0 { Direction::Right } else { Direction::Left };
                sender.enqueue(direction);
            }
        });

        let mut drained = Vec::new();
        while !producer.is_finished() {
            drained.extend(queue.drain_all());
        }
        producer.join().unwrap();
        drained.extend(queue.drain_all());

        let expected: Vec<Command> = (0..1000)
            .map(|i| if i % 3 == 0 { Direction::Right } else { Direction::Left })
            .map(Command::from)
            .collect();
        assert_eq!(drained, expected);
    }
}
