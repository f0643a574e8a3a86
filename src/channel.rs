//! Bounded mailbox between the configuration context and the render loop
//!
//! Any number of producers (button handler, web layer) post messages; the
//! render loop drains them at the start of a frame. Access is serialized
//! with `critical-section`, so posting from an interrupt is fine.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

/// Returned by a post to a full mailbox, carrying the rejected message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MailboxFull<T>(pub T);

pub struct Mailbox<T, const SIZE: usize> {
    queue: Mutex<RefCell<Deque<T, SIZE>>>,
}

impl<T, const SIZE: usize> Mailbox<T, SIZE> {
    pub const fn new() -> Self {
        Self {
            queue: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Producer handle
    pub const fn sender(&self) -> Sender<'_, T, SIZE> {
        Sender { mailbox: self }
    }

    /// Consumer handle, normally owned by the engine
    pub const fn receiver(&self) -> Receiver<'_, T, SIZE> {
        Receiver { mailbox: self }
    }

    pub fn post(&self, message: T) -> Result<(), MailboxFull<T>> {
        critical_section::with(|cs| {
            self.queue
                .borrow(cs)
                .borrow_mut()
                .push_back(message)
                .map_err(MailboxFull)
        })
    }

    pub fn take(&self) -> Option<T> {
        critical_section::with(|cs| self.queue.borrow(cs).borrow_mut().pop_front())
    }

    /// Messages waiting to be taken
    pub fn pending(&self) -> usize {
        critical_section::with(|cs| self.queue.borrow(cs).borrow().len())
    }

    /// Drop every waiting message
    pub fn discard(&self) {
        critical_section::with(|cs| self.queue.borrow(cs).borrow_mut().clear());
    }
}

impl<T, const SIZE: usize> Default for Mailbox<T, SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub struct Sender<'a, T, const SIZE: usize> {
    mailbox: &'a Mailbox<T, SIZE>,
}

impl<T, const SIZE: usize> Sender<'_, T, SIZE> {
    pub fn post(&self, message: T) -> Result<(), MailboxFull<T>> {
        self.mailbox.post(message)
    }
}

#[derive(Clone, Copy)]
pub struct Receiver<'a, T, const SIZE: usize> {
    mailbox: &'a Mailbox<T, SIZE>,
}

impl<T, const SIZE: usize> Receiver<'_, T, SIZE> {
    pub fn take(&self) -> Option<T> {
        self.mailbox.take()
    }

    /// Drop every waiting message
    pub fn discard(&self) {
        self.mailbox.discard();
    }
}
