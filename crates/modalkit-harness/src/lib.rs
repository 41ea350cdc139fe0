#![forbid(unsafe_code)]

//! In-memory [`Dom`] backend with a virtual clock.
//!
//! `FakeDom` keeps an arena of element nodes, a handler registry, and a timer
//! queue driven by [`FakeDom::advance`]. Tests dispatch input with
//! [`FakeDom::click`], [`FakeDom::keyup`], and [`FakeDom::resize`], and
//! inspect the tree with the query helpers.
//!
//! # Invariants
//!
//! - Zero-duration animations and timeouts complete inline, before the call
//!   returns; nonzero ones complete during `advance`, in deadline order
//!   (registration order breaks ties).
//! - No internal borrow is held while a user callback runs, so callbacks may
//!   re-enter the backend freely (remove nodes, deregister handlers, schedule
//!   more timers).
//! - [`Dom::remove`] destroys a subtree and every click handler bound inside
//!   it; [`Dom::detach`] preserves both.
//!
//! # Failure modes
//!
//! - Operating on a destroyed node is a silent no-op, mirroring how detached
//!   live collections behave in a document; queries on it return empty.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use ahash::AHashMap;
use modalkit_core::{Dom, HandlerId, Markup, NodeId, StyleProp};

type ClickFn = Rc<RefCell<dyn FnMut(NodeId)>>;
type KeyupFn = Rc<RefCell<dyn FnMut(u32)>>;
type ResizeFn = Rc<RefCell<dyn FnMut()>>;

struct FakeNode {
    tag: String,
    classes: Vec<String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    styles: AHashMap<StyleProp, f64>,
    outer_height: f64,
    alive: bool,
}

enum HandlerKind {
    Click { node: NodeId, callback: ClickFn },
    Keyup(KeyupFn),
    Resize(ResizeFn),
}

struct HandlerEntry {
    id: HandlerId,
    kind: HandlerKind,
}

struct TimerEntry {
    due: Duration,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct State {
    nodes: Vec<FakeNode>,
    body: Vec<NodeId>,
    viewport_height: f64,
    handlers: Vec<HandlerEntry>,
    next_handler: u64,
    timers: Vec<TimerEntry>,
    next_timer: u64,
    now: Duration,
}

/// Deterministic in-memory document. Cloning yields a second handle to the
/// same document.
#[derive(Clone)]
pub struct FakeDom {
    state: Rc<RefCell<State>>,
}

impl Default for FakeDom {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDom {
    /// Create an empty document with a 768px viewport.
    pub fn new() -> Self {
        let state = State {
            viewport_height: 768.0,
            ..State::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Set the viewport height. Dispatch [`FakeDom::resize`] separately.
    pub fn set_viewport_height(&self, height: f64) {
        self.state.borrow_mut().viewport_height = height;
    }

    /// Set the measured outer height of a node. Defaults to 0.
    pub fn set_outer_height(&self, node: NodeId, height: f64) {
        let mut state = self.state.borrow_mut();
        if let Some(n) = state.nodes.get_mut(node.raw() as usize) {
            n.outer_height = height;
        }
    }

    /// Dispatch a click on `target`, bubbling to its ancestors. Every click
    /// handler along the chain observes the original target.
    pub fn click(&self, target: NodeId) {
        let chain = {
            let state = self.state.borrow();
            let mut chain = Vec::new();
            let mut cursor = Some(target);
            while let Some(node) = cursor {
                match state.nodes.get(node.raw() as usize) {
                    Some(n) if n.alive => {
                        chain.push(node);
                        cursor = n.parent;
                    }
                    _ => break,
                }
            }
            chain
        };

        for node in chain {
            let callbacks: Vec<ClickFn> = {
                let state = self.state.borrow();
                if !state.is_alive(node) {
                    continue;
                }
                state
                    .handlers
                    .iter()
                    .filter_map(|entry| match &entry.kind {
                        HandlerKind::Click { node: bound, callback } if *bound == node => {
                            Some(Rc::clone(callback))
                        }
                        _ => None,
                    })
                    .collect()
            };
            for callback in callbacks {
                (callback.borrow_mut())(target);
            }
        }
    }

    /// Dispatch a document-level key-up.
    pub fn keyup(&self, code: u32) {
        let callbacks: Vec<KeyupFn> = {
            let state = self.state.borrow();
            state
                .handlers
                .iter()
                .filter_map(|entry| match &entry.kind {
                    HandlerKind::Keyup(callback) => Some(Rc::clone(callback)),
                    _ => None,
                })
                .collect()
        };
        for callback in callbacks {
            (callback.borrow_mut())(code);
        }
    }

    /// Dispatch a window resize.
    pub fn resize(&self) {
        let callbacks: Vec<ResizeFn> = {
            let state = self.state.borrow();
            state
                .handlers
                .iter()
                .filter_map(|entry| match &entry.kind {
                    HandlerKind::Resize(callback) => Some(Rc::clone(callback)),
                    _ => None,
                })
                .collect()
        };
        for callback in callbacks {
            (callback.borrow_mut())();
        }
    }

    /// Advance the virtual clock, firing due timers in deadline order.
    pub fn advance(&self, delta: Duration) {
        let target = self.state.borrow().now + delta;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let due = state
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.seq))
                    .map(|(i, _)| i);
                match due {
                    Some(index) => {
                        let timer = state.timers.swap_remove(index);
                        state.now = state.now.max(timer.due);
                        Some(timer.callback)
                    }
                    None => None,
                }
            };
            match next {
                Some(callback) => callback(),
                None => break,
            }
        }
        self.state.borrow_mut().now = target;
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Whether the node is alive and attached to the document body.
    pub fn is_mounted(&self, node: NodeId) -> bool {
        let state = self.state.borrow();
        if !state.is_alive(node) {
            return false;
        }
        let mut cursor = node;
        loop {
            match state.nodes[cursor.raw() as usize].parent {
                Some(parent) => cursor = parent,
                None => return state.body.contains(&cursor),
            }
        }
    }

    /// Whether the node still exists (mounted or detached).
    pub fn exists(&self, node: NodeId) -> bool {
        self.state.borrow().is_alive(node)
    }

    /// Tag name of a node.
    pub fn tag(&self, node: NodeId) -> String {
        let state = self.state.borrow();
        state
            .nodes
            .get(node.raw() as usize)
            .map(|n| n.tag.clone())
            .unwrap_or_default()
    }

    /// Text content of a node.
    pub fn text(&self, node: NodeId) -> String {
        let state = self.state.borrow();
        state
            .nodes
            .get(node.raw() as usize)
            .map(|n| n.text.clone())
            .unwrap_or_default()
    }

    /// Classes of a node.
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        let state = self.state.borrow();
        state
            .nodes
            .get(node.raw() as usize)
            .map(|n| n.classes.clone())
            .unwrap_or_default()
    }

    /// Children of a node, in document order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        let state = self.state.borrow();
        state
            .nodes
            .get(node.raw() as usize)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Current value of an inline style property, if set.
    pub fn style(&self, node: NodeId, prop: StyleProp) -> Option<f64> {
        let state = self.state.borrow();
        state
            .nodes
            .get(node.raw() as usize)
            .and_then(|n| n.styles.get(&prop).copied())
    }

    /// Number of live handler registrations, global and element-bound.
    pub fn handler_count(&self) -> usize {
        self.state.borrow().handlers.len()
    }

    /// Number of timers not yet fired.
    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    fn build(state: &mut State, fragment: &Markup, parent: Option<NodeId>) -> NodeId {
        let id = NodeId::new(state.nodes.len() as u64);
        state.nodes.push(FakeNode {
            tag: fragment.tag.clone(),
            classes: fragment.classes.clone(),
            text: fragment.text.clone(),
            parent,
            children: Vec::new(),
            styles: AHashMap::new(),
            outer_height: 0.0,
            alive: true,
        });
        for child in &fragment.children {
            let child_id = Self::build(state, child, Some(id));
            state.nodes[id.raw() as usize].children.push(child_id);
        }
        id
    }

    fn collect_subtree(state: &State, root: NodeId, out: &mut Vec<NodeId>) {
        out.push(root);
        if let Some(node) = state.nodes.get(root.raw() as usize) {
            for &child in &node.children {
                Self::collect_subtree(state, child, out);
            }
        }
    }

    fn unlink(state: &mut State, node: NodeId) {
        if let Some(parent) = state.nodes[node.raw() as usize].parent.take() {
            state.nodes[parent.raw() as usize]
                .children
                .retain(|&c| c != node);
        }
        state.body.retain(|&n| n != node);
    }

    fn register(&self, kind: HandlerKind) -> HandlerId {
        let mut state = self.state.borrow_mut();
        let id = HandlerId::new(state.next_handler);
        state.next_handler += 1;
        state.handlers.push(HandlerEntry { id, kind });
        id
    }

    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) {
        let mut state = self.state.borrow_mut();
        let due = state.now + delay;
        let seq = state.next_timer;
        state.next_timer += 1;
        state.timers.push(TimerEntry { due, seq, callback });
    }
}

impl State {
    fn is_alive(&self, node: NodeId) -> bool {
        self.nodes
            .get(node.raw() as usize)
            .is_some_and(|n| n.alive)
    }

    fn find_descendants(&self, root: NodeId, class: &str, first_only: bool) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self
            .nodes
            .get(root.raw() as usize)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(node) = stack.pop() {
            let entry = &self.nodes[node.raw() as usize];
            if entry.classes.iter().any(|c| c == class) {
                found.push(node);
                if first_only {
                    break;
                }
            }
            stack.extend(entry.children.iter().rev().copied());
        }
        found
    }
}

impl Dom for FakeDom {
    fn create(&self, fragment: &Markup) -> NodeId {
        let mut state = self.state.borrow_mut();
        Self::build(&mut state, fragment, None)
    }

    fn append_to_body(&self, node: NodeId) {
        let mut state = self.state.borrow_mut();
        if state.is_alive(node) && !state.body.contains(&node) {
            state.nodes[node.raw() as usize].parent = None;
            state.body.push(node);
        }
    }

    fn find(&self, root: NodeId, class: &str) -> Option<NodeId> {
        let state = self.state.borrow();
        state.find_descendants(root, class, true).first().copied()
    }

    fn find_all(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        let state = self.state.borrow();
        state.find_descendants(root, class, false)
    }

    fn append_markup(&self, parent: NodeId, fragment: &Markup) {
        let mut state = self.state.borrow_mut();
        if !state.is_alive(parent) {
            return;
        }
        let child = Self::build(&mut state, fragment, Some(parent));
        state.nodes[parent.raw() as usize].children.push(child);
    }

    fn add_class(&self, node: NodeId, class: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(n) = state.nodes.get_mut(node.raw() as usize)
            && !class.is_empty()
            && !n.classes.iter().any(|c| c == class)
        {
            n.classes.push(class.to_owned());
        }
    }

    fn set_style(&self, node: NodeId, prop: StyleProp, value: f64) {
        let mut state = self.state.borrow_mut();
        if let Some(n) = state.nodes.get_mut(node.raw() as usize) {
            n.styles.insert(prop, value);
        }
    }

    fn animate(
        &self,
        node: NodeId,
        prop: StyleProp,
        target: f64,
        duration: Duration,
        done: Option<Box<dyn FnOnce()>>,
    ) {
        if duration.is_zero() {
            self.set_style(node, prop, target);
            if let Some(done) = done {
                done();
            }
            return;
        }
        let dom = self.clone();
        self.schedule(
            duration,
            Box::new(move || {
                dom.set_style(node, prop, target);
                if let Some(done) = done {
                    done();
                }
            }),
        );
    }

    fn outer_height(&self, node: NodeId) -> f64 {
        let state = self.state.borrow();
        state
            .nodes
            .get(node.raw() as usize)
            .map(|n| n.outer_height)
            .unwrap_or(0.0)
    }

    fn viewport_height(&self) -> f64 {
        self.state.borrow().viewport_height
    }

    fn remove(&self, node: NodeId) {
        let mut state = self.state.borrow_mut();
        if !state.is_alive(node) {
            return;
        }
        Self::unlink(&mut state, node);
        let mut subtree = Vec::new();
        Self::collect_subtree(&state, node, &mut subtree);
        for &n in &subtree {
            state.nodes[n.raw() as usize].alive = false;
        }
        state.handlers.retain(|entry| match &entry.kind {
            HandlerKind::Click { node: bound, .. } => !subtree.contains(bound),
            _ => true,
        });
    }

    fn detach(&self, node: NodeId) {
        let mut state = self.state.borrow_mut();
        if state.is_alive(node) {
            Self::unlink(&mut state, node);
        }
    }

    fn on_click(&self, node: NodeId, handler: Box<dyn FnMut(NodeId)>) -> HandlerId {
        self.register(HandlerKind::Click {
            node,
            callback: Rc::new(RefCell::new(handler)),
        })
    }

    fn on_document_keyup(&self, handler: Box<dyn FnMut(u32)>) -> HandlerId {
        self.register(HandlerKind::Keyup(Rc::new(RefCell::new(handler))))
    }

    fn on_window_resize(&self, handler: Box<dyn FnMut()>) -> HandlerId {
        self.register(HandlerKind::Resize(Rc::new(RefCell::new(handler))))
    }

    fn off(&self, handler: HandlerId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.handlers.len();
        state.handlers.retain(|entry| entry.id != handler);
        state.handlers.len() != before
    }

    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) {
        if delay.is_zero() {
            callback();
            return;
        }
        self.schedule(delay, callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn tree() -> Markup {
        Markup::new("div").class("outer").child(
            Markup::new("div")
                .class("inner")
                .child(Markup::new("button").class("js-button").text("OK")),
        )
    }

    #[test]
    fn create_and_query() {
        let dom = FakeDom::new();
        let root = dom.create(&tree());
        let inner = dom.find(root, "inner").unwrap();
        assert_eq!(dom.tag(inner), "div");
        let button = dom.find(root, "js-button").unwrap();
        assert_eq!(dom.text(button), "OK");
        assert!(dom.find(root, "outer").is_none(), "root itself is excluded");
    }

    #[test]
    fn mount_detach_remove() {
        let dom = FakeDom::new();
        let root = dom.create(&tree());
        assert!(!dom.is_mounted(root));
        dom.append_to_body(root);
        assert!(dom.is_mounted(root));
        dom.detach(root);
        assert!(!dom.is_mounted(root));
        assert!(dom.exists(root));
        dom.remove(root);
        assert!(!dom.exists(root));
    }

    #[test]
    fn click_bubbles_with_original_target() {
        let dom = FakeDom::new();
        let root = dom.create(&tree());
        let button = dom.find(root, "js-button").unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&seen);
        dom.on_click(button, Box::new(move |t| log.borrow_mut().push(("button", t))));
        let log = Rc::clone(&seen);
        dom.on_click(root, Box::new(move |t| log.borrow_mut().push(("root", t))));

        dom.click(button);
        assert_eq!(*seen.borrow(), vec![("button", button), ("root", button)]);
    }

    #[test]
    fn remove_drops_subtree_click_handlers() {
        let dom = FakeDom::new();
        let root = dom.create(&tree());
        let button = dom.find(root, "js-button").unwrap();
        dom.on_click(button, Box::new(|_| {}));
        assert_eq!(dom.handler_count(), 1);
        dom.remove(root);
        assert_eq!(dom.handler_count(), 0);
    }

    #[test]
    fn detach_keeps_click_handlers() {
        let dom = FakeDom::new();
        let root = dom.create(&tree());
        dom.on_click(root, Box::new(|_| {}));
        dom.detach(root);
        assert_eq!(dom.handler_count(), 1);
    }

    #[test]
    fn timers_fire_in_deadline_order() {
        let dom = FakeDom::new();
        let fired = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&fired);
        dom.set_timeout(Duration::from_millis(200), Box::new(move || log.borrow_mut().push("late")));
        let log = Rc::clone(&fired);
        dom.set_timeout(Duration::from_millis(100), Box::new(move || log.borrow_mut().push("early")));

        dom.advance(Duration::from_millis(150));
        assert_eq!(*fired.borrow(), vec!["early"]);
        dom.advance(Duration::from_millis(100));
        assert_eq!(*fired.borrow(), vec!["early", "late"]);
    }

    #[test]
    fn zero_timeout_runs_inline() {
        let dom = FakeDom::new();
        let fired = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&fired);
        dom.set_timeout(Duration::ZERO, Box::new(move || *flag.borrow_mut() = true));
        assert!(*fired.borrow());
    }

    #[test]
    fn zero_duration_animation_completes_inline() {
        let dom = FakeDom::new();
        let root = dom.create(&Markup::new("div"));
        let fired = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&fired);
        dom.animate(
            root,
            StyleProp::Opacity,
            1.0,
            Duration::ZERO,
            Some(Box::new(move || *flag.borrow_mut() = true)),
        );
        assert_eq!(dom.style(root, StyleProp::Opacity), Some(1.0));
        assert!(*fired.borrow());
    }

    #[test]
    fn nonzero_animation_completes_on_advance() {
        let dom = FakeDom::new();
        let root = dom.create(&Markup::new("div"));
        dom.animate(root, StyleProp::Top, 50.0, Duration::from_millis(200), None);
        assert_eq!(dom.style(root, StyleProp::Top), None);
        dom.advance(Duration::from_millis(200));
        assert_eq!(dom.style(root, StyleProp::Top), Some(50.0));
    }

    #[test]
    fn timer_callback_may_schedule_more_timers() {
        let dom = FakeDom::new();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&fired);
        let chained = dom.clone();
        dom.set_timeout(
            Duration::from_millis(100),
            Box::new(move || {
                log.borrow_mut().push("first");
                let log = Rc::clone(&log);
                chained.set_timeout(
                    Duration::from_millis(100),
                    Box::new(move || log.borrow_mut().push("second")),
                );
            }),
        );
        dom.advance(Duration::from_millis(250));
        assert_eq!(*fired.borrow(), vec!["first", "second"]);
    }
}
