use crate::generational_arena::{Error, GenArena, Handle};

const DEFAULT_CAPACITY: usize = 16;

struct Node<T> {
    prev: Option<Handle>,
    next: Option<Handle>,
    data: T,
}

/// Doubly linked list whose nodes live in a [`GenArena`]. Positions are
/// [`Handle`]s, so insertion and removal next to a known position are O(1)
/// and a position that was removed can never reach another node.
pub struct LinkedList<T> {
    nodes: GenArena<Node<T>>,
    head: Option<Handle>,
    tail: Option<Handle>,
}

impl<T> LinkedList<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: GenArena::new(capacity.max(1)),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first(&self) -> Option<Handle> {
        self.head
    }

    pub fn last(&self) -> Option<Handle> {
        self.tail
    }

    pub fn contains(&self, position: Handle) -> bool {
        self.nodes.contains(position)
    }

    pub fn get(&self, position: Handle) -> Option<&T> {
        self.nodes.borrow(position).ok().map(|node| &node.data)
    }

    pub fn get_mut(&mut self, position: Handle) -> Option<&mut T> {
        self.nodes.borrow_mut(position).ok().map(|node| &mut node.data)
    }

    pub fn next(&self, position: Handle) -> Option<Handle> {
        self.nodes.borrow(position).ok().and_then(|node| node.next)
    }

    pub fn prev(&self, position: Handle) -> Option<Handle> {
        self.nodes.borrow(position).ok().and_then(|node| node.prev)
    }

    pub fn push_back(&mut self, data: T) -> Result<Handle, Error> {
        match self.tail {
            Some(tail) => self.insert_after(tail, data),
            None => {
                let handle = self.nodes.add(Node {
                    prev: None,
                    next: None,
                    data,
                })?;
                self.head = Some(handle);
                self.tail = Some(handle);
                Ok(handle)
            }
        }
    }

    pub fn push_front(&mut self, data: T) -> Result<Handle, Error> {
        match self.head {
            Some(head) => self.insert_before(head, data),
            None => self.push_back(data),
        }
    }

    /// Links a new node right after `position`.
    pub fn insert_after(&mut self, position: Handle, data: T) -> Result<Handle, Error> {
        let next = self.nodes.borrow(position)?.next;
        let handle = self.nodes.add(Node {
            prev: Some(position),
            next,
            data,
        })?;

        self.nodes.borrow_mut(position)?.next = Some(handle);
        match next {
            Some(next) => self.nodes.borrow_mut(next)?.prev = Some(handle),
            None => self.tail = Some(handle),
        }

        Ok(handle)
    }

    /// Links a new node right before `position`.
    pub fn insert_before(&mut self, position: Handle, data: T) -> Result<Handle, Error> {
        let prev = self.nodes.borrow(position)?.prev;
        let handle = self.nodes.add(Node {
            prev,
            next: Some(position),
            data,
        })?;

        self.nodes.borrow_mut(position)?.prev = Some(handle);
        match prev {
            Some(prev) => self.nodes.borrow_mut(prev)?.next = Some(handle),
            None => self.head = Some(handle),
        }

        Ok(handle)
    }

    /// Unlinks the node at `position` and hands its data back.
    pub fn remove(&mut self, position: Handle) -> Result<T, Error> {
        let node = self.nodes.remove(position)?;

        match node.prev {
            Some(prev) => self.nodes.borrow_mut(prev)?.next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes.borrow_mut(next)?.prev = node.prev,
            None => self.tail = node.prev,
        }

        Ok(node.data)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }
}

impl<T> Default for LinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Front-to-back iterator yielding each node's position along with its data.
pub struct Iter<'a, T> {
    list: &'a LinkedList<T>,
    cursor: Option<Handle>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Handle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let list = self.list;
        let position = self.cursor?;
        let node = list.nodes.borrow(position).ok()?;
        self.cursor = node.next;
        Some((position, &node.data))
    }
}
