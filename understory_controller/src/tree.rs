// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Controller arena: ownership edges, activity scoping, refresh batching, close.

use alloc::{boxed::Box, vec::Vec};
use core::fmt::Debug;

use understory_gesture::router::Registrations;

use crate::error::ControllerError;
use crate::types::{ControllerFlags, ControllerId};
use crate::view::{Binding, Bound, ModelView, Static, Template, View};

struct Node<K> {
    generation: u32,
    binding: Box<dyn Binding<K>>,
    parent: Option<ControllerId>,
    children: Vec<ControllerId>,
    flags: ControllerFlags,
}

/// Arena of controllers, each owning one view.
///
/// `K` is the element identity views report for gesture registration; `S` is
/// the scope templates are instantiated under.
///
/// ## Ownership
///
/// Every controller has at most one logical parent, which owns it. Parent
/// edges are not strong references: closing a controller closes its owned
/// children first, bottom-up, and nothing else ever frees a node.
///
/// ## Refresh
///
/// Model mutations do not touch the view. They mark the controller dirty and
/// queue it once; [`ControllerTree::flush_refreshes`] later writes the latest
/// model into each queued view exactly once.
///
/// ## Example
///
/// ```rust
/// use understory_controller::tree::ControllerTree;
/// use understory_controller::view::{ModelView, View};
///
/// struct Label { id: u32, text: String }
///
/// impl View<u32> for Label {
///     fn element(&self) -> u32 { self.id }
/// }
///
/// impl ModelView<u32> for Label {
///     type Model = u32;
///     fn apply_model(&mut self, count: &u32) { self.text = format!("{count} missions"); }
/// }
///
/// let mut tree: ControllerTree<u32> = ControllerTree::new();
/// let label = tree.insert_bound(Label { id: 1, text: String::new() }, 0_u32);
/// assert_eq!(tree.view::<Label>(label).unwrap().text, "0 missions");
///
/// for _ in 0..3 {
///     tree.update_model(label, |n: &mut u32| *n += 1).unwrap();
/// }
/// // Still the first paint until the refresh is flushed.
/// assert_eq!(tree.view::<Label>(label).unwrap().text, "0 missions");
/// assert_eq!(tree.flush_refreshes(), 1);
/// assert_eq!(tree.view::<Label>(label).unwrap().text, "3 missions");
/// ```
pub struct ControllerTree<K, S = ()> {
    /// slots
    nodes: Vec<Option<Node<K>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    pending: Vec<ControllerId>,
    root_scope: Option<S>,
}

impl<K, S> Debug for ControllerTree<K, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let live = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("ControllerTree")
            .field("live", &live)
            .field("free_list", &self.free_list.len())
            .field("pending", &self.pending.len())
            .field("has_root_scope", &self.root_scope.is_some())
            .finish_non_exhaustive()
    }
}

impl<K, S> Default for ControllerTree<K, S> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            pending: Vec::new(),
            root_scope: None,
        }
    }
}

impl<K: Copy + Eq + Debug + 'static, S> ControllerTree<K, S> {
    /// Create an empty tree without a root scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tree whose templates default to `scope`.
    pub fn with_root_scope(scope: S) -> Self {
        Self {
            root_scope: Some(scope),
            ..Self::default()
        }
    }

    /// Replace the root scope.
    pub fn set_root_scope(&mut self, scope: Option<S>) {
        self.root_scope = scope;
    }

    /// The root scope, if any.
    pub fn root_scope(&self) -> Option<&S> {
        self.root_scope.as_ref()
    }

    // --- construction ---

    fn alloc(&mut self, binding: Box<dyn Binding<K>>) -> ControllerId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ControllerId uses 32-bit indices."
            )]
            (idx as u32, generation)
        } else {
            self.nodes.push(None);
            self.generations.push(1);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ControllerId uses 32-bit indices."
            )]
            ((self.nodes.len() - 1) as u32, 1_u32)
        };
        let id = ControllerId::new(idx, generation);
        tracing::trace!(?id, element = ?binding.element(), "controller created");
        self.nodes[id.idx()] = Some(Node {
            generation,
            binding,
            parent: None,
            children: Vec::new(),
            flags: ControllerFlags::default(),
        });
        id
    }

    /// Adopt an existing view without a model.
    pub fn insert<V: View<K> + 'static>(&mut self, view: V) -> ControllerId {
        self.alloc(Box::new(Static(view)))
    }

    /// Adopt an existing view and its model.
    ///
    /// The model is applied immediately so the first paint does not wait for a
    /// flush.
    pub fn insert_bound<V>(&mut self, view: V, model: V::Model) -> ControllerId
    where
        V: ModelView<K> + 'static,
    {
        let mut bound = Bound { view, model };
        bound.view.apply_model(&bound.model);
        self.alloc(Box::new(bound))
    }

    fn scope<'a>(&'a self, scope: Option<&'a S>) -> Result<&'a S, ControllerError> {
        scope.or(self.root_scope.as_ref()).ok_or_else(|| {
            tracing::warn!("instantiation without a scope");
            ControllerError::MissingRootScope
        })
    }

    /// Instantiate `template` under `scope`, or the root scope when `None`.
    ///
    /// Without either scope nothing is created.
    pub fn instantiate<T>(
        &mut self,
        template: &T,
        scope: Option<&S>,
    ) -> Result<ControllerId, ControllerError>
    where
        T: Template<S>,
        T::View: View<K> + 'static,
    {
        let view = template.instantiate(self.scope(scope)?);
        Ok(self.insert(view))
    }

    /// Instantiate `template` and bind `model`, applying it immediately.
    pub fn instantiate_bound<T>(
        &mut self,
        template: &T,
        scope: Option<&S>,
        model: <T::View as ModelView<K>>::Model,
    ) -> Result<ControllerId, ControllerError>
    where
        T: Template<S>,
        T::View: ModelView<K> + 'static,
    {
        let view = template.instantiate(self.scope(scope)?);
        Ok(self.insert_bound(view, model))
    }

    // --- structure ---

    /// Returns true if `id` refers to a live controller.
    pub fn is_alive(&self, id: ControllerId) -> bool {
        self.node(id).is_some()
    }

    fn node(&self, id: ControllerId) -> Option<&Node<K>> {
        self.nodes
            .get(id.idx())?
            .as_ref()
            .filter(|n| n.generation == id.1)
    }

    fn node_mut(&mut self, id: ControllerId) -> Option<&mut Node<K>> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn live(&self, id: ControllerId) -> Result<&Node<K>, ControllerError> {
        self.node(id).ok_or(ControllerError::Stale(id))
    }

    fn live_mut(&mut self, id: ControllerId) -> Result<&mut Node<K>, ControllerError> {
        self.node_mut(id).ok_or(ControllerError::Stale(id))
    }

    /// Number of live controllers.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Returns true if there are no live controllers.
    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(Option::is_none)
    }

    /// The element identity of `id`'s view.
    pub fn element_of(&self, id: ControllerId) -> Option<K> {
        self.node(id).map(|n| n.binding.element())
    }

    /// The logical parent of `id`, or `None` for roots and stale ids.
    pub fn parent_of(&self, id: ControllerId) -> Option<ControllerId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Owned children of `id`, or an empty slice if stale.
    pub fn children_of(&self, id: ControllerId) -> &[ControllerId] {
        self.node(id).map_or(&[], |n| &n.children)
    }

    /// State bits of `id`.
    pub fn flags(&self, id: ControllerId) -> Option<ControllerFlags> {
        self.node(id).map(|n| n.flags)
    }

    fn is_ancestor(&self, ancestor: ControllerId, mut of: ControllerId) -> bool {
        while let Some(p) = self.parent_of(of) {
            if p == ancestor {
                return true;
            }
            of = p;
        }
        false
    }

    /// Make `parent` the owner of `child` and return `child`.
    ///
    /// Adding a child `parent` already owns changes nothing. A child owned
    /// elsewhere moves to `parent`.
    pub fn add_child(
        &mut self,
        parent: ControllerId,
        child: ControllerId,
    ) -> Result<ControllerId, ControllerError> {
        self.live(parent)?;
        let current = self.live(child)?.parent;
        if current == Some(parent) {
            return Ok(child);
        }
        if parent == child || self.is_ancestor(child, parent) {
            tracing::warn!(?parent, ?child, "rejected cyclic attachment");
            return Err(ControllerError::Cycle { parent, child });
        }
        if let Some(old) = current {
            self.unlink_parent(child, old);
        }
        self.link_parent(child, parent);
        Ok(child)
    }

    /// Release `child` from `parent`. Returns false if `parent` did not own it.
    ///
    /// The child stays alive as a root.
    pub fn remove_child(&mut self, parent: ControllerId, child: ControllerId) -> bool {
        if self.parent_of(child) != Some(parent) {
            return false;
        }
        self.unlink_parent(child, parent);
        true
    }

    fn link_parent(&mut self, id: ControllerId, parent: ControllerId) {
        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = Some(parent);
        }
    }

    fn unlink_parent(&mut self, id: ControllerId, parent: ControllerId) {
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = None;
        }
    }

    // --- visibility and activity ---

    fn set_visible(&mut self, id: ControllerId, visible: bool) -> bool {
        let Some(n) = self.node_mut(id) else {
            return false;
        };
        n.flags.set(ControllerFlags::VISIBLE, visible);
        n.binding.set_visible(visible);
        true
    }

    /// Show the view of `id`. Returns false if stale.
    pub fn show(&mut self, id: ControllerId) -> bool {
        self.set_visible(id, true)
    }

    /// Hide the view of `id`. Returns false if stale.
    pub fn hide(&mut self, id: ControllerId) -> bool {
        self.set_visible(id, false)
    }

    /// Returns true if the view of `id` is shown.
    pub fn is_visible(&self, id: ControllerId) -> bool {
        self.node(id)
            .is_some_and(|n| n.flags.contains(ControllerFlags::VISIBLE))
    }

    /// Take the activity marker for `id`. Returns false if stale or already held.
    pub fn acquire_activity(&mut self, id: ControllerId) -> bool {
        self.node_mut(id).is_some_and(|n| {
            let had = n.flags.contains(ControllerFlags::ACTIVITY);
            n.flags.insert(ControllerFlags::ACTIVITY);
            !had
        })
    }

    /// Drop the activity marker of `id`. Returns false if stale or not held.
    pub fn release_activity(&mut self, id: ControllerId) -> bool {
        self.node_mut(id).is_some_and(|n| {
            let had = n.flags.contains(ControllerFlags::ACTIVITY);
            n.flags.remove(ControllerFlags::ACTIVITY);
            had
        })
    }

    /// Returns true if `id` or any of its ancestors holds an activity marker.
    pub fn is_active_ui(&self, id: ControllerId) -> bool {
        let mut cursor = Some(id);
        while let Some(c) = cursor {
            let Some(n) = self.node(c) else {
                return false;
            };
            if n.flags.contains(ControllerFlags::ACTIVITY) {
                return true;
            }
            cursor = n.parent;
        }
        false
    }

    // --- view and model access ---

    /// The view of `id`, if it is a `V`.
    pub fn view<V: 'static>(&self, id: ControllerId) -> Option<&V> {
        self.node(id)?.binding.view_any().downcast_ref()
    }

    /// The view of `id` mutably, if it is a `V`.
    pub fn view_mut<V: 'static>(&mut self, id: ControllerId) -> Option<&mut V> {
        self.node_mut(id)?.binding.view_any_mut().downcast_mut()
    }

    /// The model of `id`, if it has one of type `M`.
    pub fn model<M: 'static>(&self, id: ControllerId) -> Option<&M> {
        self.node(id)?.binding.model_any()?.downcast_ref()
    }

    /// The model of `id` mutably, if it has one of type `M`.
    ///
    /// Mutations through this reference are not shown until a refresh is
    /// requested; [`Self::update_model`] does both.
    pub fn model_mut<M: 'static>(&mut self, id: ControllerId) -> Option<&mut M> {
        self.node_mut(id)?.binding.model_any_mut()?.downcast_mut()
    }

    /// Mutate the model of `id` and request a refresh.
    pub fn update_model<M: 'static>(
        &mut self,
        id: ControllerId,
        f: impl FnOnce(&mut M),
    ) -> Result<(), ControllerError> {
        let model = self
            .live_mut(id)?
            .binding
            .model_any_mut()
            .and_then(|m| m.downcast_mut::<M>())
            .ok_or(ControllerError::ModelMismatch(id))?;
        f(model);
        self.request_refresh(id);
        Ok(())
    }

    // --- refresh ---

    /// Queue a refresh of `id` for the next flush.
    ///
    /// Returns true if this call queued it; false if one was already pending
    /// or `id` is stale.
    pub fn request_refresh(&mut self, id: ControllerId) -> bool {
        let Some(n) = self.node_mut(id) else {
            return false;
        };
        if n.flags.contains(ControllerFlags::DIRTY) {
            return false;
        }
        n.flags.insert(ControllerFlags::DIRTY);
        self.pending.push(id);
        true
    }

    /// Number of queued refreshes, including those of closed controllers.
    pub fn pending_refreshes(&self) -> usize {
        self.pending.len()
    }

    /// Apply every queued refresh once and return how many views were written.
    ///
    /// Controllers closed since their request are skipped.
    pub fn flush_refreshes(&mut self) -> usize {
        let pending = core::mem::take(&mut self.pending);
        let mut applied = 0;
        for id in pending {
            let Some(n) = self.node_mut(id) else {
                tracing::trace!(?id, "skipped refresh of closed controller");
                continue;
            };
            n.flags.remove(ControllerFlags::DIRTY);
            if n.binding.apply() {
                applied += 1;
            }
        }
        applied
    }

    // --- teardown ---

    /// Close `id` and everything it owns.
    ///
    /// Descendants close first, bottom-up. For each controller in that order:
    /// it is detached from its parent, its element is removed from every
    /// gesture registry, its view is destroyed, and its id becomes stale.
    /// Returns the closed ids in close order, ending with `id`.
    pub fn close(
        &mut self,
        id: ControllerId,
        registrations: &mut impl Registrations<K>,
    ) -> Result<Vec<ControllerId>, ControllerError> {
        self.live(id)?;
        let order = self.post_order(id);
        for &c in &order {
            if let Some(parent) = self.parent_of(c) {
                self.unlink_parent(c, parent);
            }
            let Some(mut node) = self.nodes[c.idx()].take() else {
                continue;
            };
            let element = node.binding.element();
            registrations.unregister_all(&element);
            node.binding.destroy();
            self.free_list.push(c.idx());
            tracing::debug!(id = ?c, ?element, "controller closed");
        }
        Ok(order)
    }

    fn post_order(&self, root: ControllerId) -> Vec<ControllerId> {
        let mut out = Vec::new();
        // (node, next child index)
        let mut stack = alloc::vec![(root, 0_usize)];
        while let Some((node, next)) = stack.pop() {
            match self.children_of(node).get(next) {
                Some(&child) => {
                    stack.push((node, next + 1));
                    stack.push((child, 0));
                }
                None => out.push(node),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;
    use understory_gesture::types::GestureKinds;

    #[derive(Clone, Debug, PartialEq)]
    enum Event {
        Applied(u32, i32),
        Visible(u32, bool),
        Destroyed(u32),
        Unregistered(u32),
    }

    type Log = Rc<RefCell<Vec<Event>>>;

    struct Widget {
        id: u32,
        log: Log,
    }

    impl View<u32> for Widget {
        fn element(&self) -> u32 {
            self.id
        }

        fn set_visible(&mut self, visible: bool) {
            self.log.borrow_mut().push(Event::Visible(self.id, visible));
        }

        fn destroy(&mut self) {
            self.log.borrow_mut().push(Event::Destroyed(self.id));
        }
    }

    impl ModelView<u32> for Widget {
        type Model = i32;

        fn apply_model(&mut self, model: &i32) {
            self.log.borrow_mut().push(Event::Applied(self.id, *model));
        }
    }

    struct Regs(Log);

    impl Registrations<u32> for Regs {
        fn unregister_all(&mut self, element: &u32) -> GestureKinds {
            self.0.borrow_mut().push(Event::Unregistered(*element));
            GestureKinds::empty()
        }
    }

    fn widget(id: u32, log: &Log) -> Widget {
        Widget {
            id,
            log: log.clone(),
        }
    }

    #[test]
    fn bound_insert_applies_immediately() {
        let log = Log::default();
        let mut tree: ControllerTree<u32> = ControllerTree::new();
        let id = tree.insert_bound(widget(1, &log), 5);
        assert_eq!(*log.borrow(), vec![Event::Applied(1, 5)]);
        assert_eq!(tree.model::<i32>(id), Some(&5));
        assert_eq!(tree.element_of(id), Some(1));
        assert_eq!(tree.pending_refreshes(), 0);
    }

    #[test]
    fn many_updates_one_apply_with_last_value() {
        let log = Log::default();
        let mut tree: ControllerTree<u32> = ControllerTree::new();
        let id = tree.insert_bound(widget(1, &log), 0);
        log.borrow_mut().clear();

        for v in 1..=4 {
            tree.update_model(id, |m: &mut i32| *m = v * 10).unwrap();
        }
        assert!(!tree.request_refresh(id));
        assert_eq!(tree.pending_refreshes(), 1);
        assert!(log.borrow().is_empty());

        assert_eq!(tree.flush_refreshes(), 1);
        assert_eq!(*log.borrow(), vec![Event::Applied(1, 40)]);
        assert!(!tree.flags(id).unwrap().contains(ControllerFlags::DIRTY));

        // The next tick queues again.
        assert!(tree.request_refresh(id));
        assert_eq!(tree.flush_refreshes(), 1);
    }

    #[test]
    fn update_model_type_checks() {
        let log = Log::default();
        let mut tree: ControllerTree<u32> = ControllerTree::new();
        let bound = tree.insert_bound(widget(1, &log), 0);
        let plain = tree.insert(widget(2, &log));
        assert_eq!(
            tree.update_model(bound, |_: &mut u64| {}),
            Err(ControllerError::ModelMismatch(bound))
        );
        assert_eq!(
            tree.update_model(plain, |_: &mut i32| {}),
            Err(ControllerError::ModelMismatch(plain))
        );
        assert_eq!(tree.pending_refreshes(), 0);
    }

    #[test]
    fn add_child_is_idempotent() {
        let log = Log::default();
        let mut tree: ControllerTree<u32> = ControllerTree::new();
        let p = tree.insert(widget(1, &log));
        let c = tree.insert(widget(2, &log));
        assert_eq!(tree.add_child(p, c), Ok(c));
        assert_eq!(tree.add_child(p, c), Ok(c));
        assert_eq!(tree.children_of(p), &[c]);
        assert_eq!(tree.parent_of(c), Some(p));
    }

    #[test]
    fn add_child_rehomes_and_rejects_cycles() {
        let log = Log::default();
        let mut tree: ControllerTree<u32> = ControllerTree::new();
        let a = tree.insert(widget(1, &log));
        let b = tree.insert(widget(2, &log));
        let c = tree.insert(widget(3, &log));
        tree.add_child(a, b).unwrap();
        tree.add_child(b, c).unwrap();

        assert_eq!(
            tree.add_child(c, a),
            Err(ControllerError::Cycle {
                parent: c,
                child: a
            })
        );
        assert_eq!(
            tree.add_child(a, a),
            Err(ControllerError::Cycle {
                parent: a,
                child: a
            })
        );

        tree.add_child(a, c).unwrap();
        assert_eq!(tree.children_of(a), &[b, c]);
        assert!(tree.children_of(b).is_empty());
    }

    #[test]
    fn remove_child_of_non_child_is_false() {
        let log = Log::default();
        let mut tree: ControllerTree<u32> = ControllerTree::new();
        let a = tree.insert(widget(1, &log));
        let b = tree.insert(widget(2, &log));
        assert!(!tree.remove_child(a, b));
        tree.add_child(a, b).unwrap();
        assert!(tree.remove_child(a, b));
        assert!(!tree.remove_child(a, b));
        assert!(tree.is_alive(b));
        assert_eq!(tree.parent_of(b), None);
    }

    #[test]
    fn activity_is_inherited_from_ancestors() {
        let log = Log::default();
        let mut tree: ControllerTree<u32> = ControllerTree::new();
        let root = tree.insert(widget(1, &log));
        let mid = tree.insert(widget(2, &log));
        let leaf = tree.insert(widget(3, &log));
        tree.add_child(root, mid).unwrap();
        tree.add_child(mid, leaf).unwrap();

        assert!(!tree.is_active_ui(leaf));
        assert!(tree.acquire_activity(mid));
        assert!(!tree.acquire_activity(mid));
        assert!(tree.is_active_ui(leaf));
        assert!(tree.is_active_ui(mid));
        assert!(!tree.is_active_ui(root));
        assert!(tree.release_activity(mid));
        assert!(!tree.release_activity(mid));
        assert!(!tree.is_active_ui(leaf));
    }

    #[test]
    fn show_and_hide_reach_the_view() {
        let log = Log::default();
        let mut tree: ControllerTree<u32> = ControllerTree::new();
        let id = tree.insert(widget(4, &log));
        assert!(tree.is_visible(id));
        assert!(tree.hide(id));
        assert!(!tree.is_visible(id));
        assert!(tree.show(id));
        assert_eq!(
            *log.borrow(),
            vec![Event::Visible(4, false), Event::Visible(4, true)]
        );
    }

    #[test]
    fn close_is_bottom_up_and_unregisters_before_destroy() {
        let log = Log::default();
        let mut regs = Regs(log.clone());
        let mut tree: ControllerTree<u32> = ControllerTree::new();
        let root = tree.insert(widget(1, &log));
        let a = tree.insert(widget(2, &log));
        let b = tree.insert(widget(3, &log));
        let a1 = tree.insert(widget(4, &log));
        let outside = tree.insert(widget(9, &log));
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.add_child(a, a1).unwrap();

        let closed = tree.close(root, &mut regs).unwrap();
        assert_eq!(closed, vec![a1, a, b, root]);
        assert_eq!(
            *log.borrow(),
            vec![
                Event::Unregistered(4),
                Event::Destroyed(4),
                Event::Unregistered(2),
                Event::Destroyed(2),
                Event::Unregistered(3),
                Event::Destroyed(3),
                Event::Unregistered(1),
                Event::Destroyed(1),
            ]
        );
        for id in closed {
            assert!(!tree.is_alive(id));
        }
        assert_eq!(tree.len(), 1);
        assert!(tree.is_alive(outside));
        assert_eq!(tree.close(root, &mut regs), Err(ControllerError::Stale(root)));
    }

    #[test]
    fn closing_a_child_detaches_it_from_the_parent() {
        let log = Log::default();
        let mut regs = Regs(log.clone());
        let mut tree: ControllerTree<u32> = ControllerTree::new();
        let p = tree.insert(widget(1, &log));
        let c = tree.insert(widget(2, &log));
        tree.add_child(p, c).unwrap();
        tree.close(c, &mut regs).unwrap();
        assert!(tree.children_of(p).is_empty());
    }

    #[test]
    fn pending_refresh_of_closed_controller_is_skipped() {
        let log = Log::default();
        let mut regs = Regs(log.clone());
        let mut tree: ControllerTree<u32> = ControllerTree::new();
        let id = tree.insert_bound(widget(1, &log), 0);
        tree.update_model(id, |m: &mut i32| *m = 7).unwrap();
        tree.close(id, &mut regs).unwrap();

        // The slot is reused by a new controller with a newer generation.
        let fresh = tree.insert_bound(widget(2, &log), 1);
        assert_ne!(fresh, id);
        log.borrow_mut().clear();
        assert_eq!(tree.flush_refreshes(), 0);
        assert!(log.borrow().is_empty());
        assert_eq!(tree.view::<Widget>(id).map(|w| w.id), None);
        assert_eq!(tree.view::<Widget>(fresh).map(|w| w.id), Some(2));
    }

    #[test]
    fn instantiate_requires_a_scope() {
        let log = Log::default();
        let template = {
            let log = log.clone();
            move |scope: &u32| Widget {
                id: *scope,
                log: log.clone(),
            }
        };
        let mut tree: ControllerTree<u32, u32> = ControllerTree::new();
        assert_eq!(
            tree.instantiate(&template, None),
            Err(ControllerError::MissingRootScope)
        );
        assert!(tree.is_empty());

        let id = tree.instantiate(&template, Some(&7)).unwrap();
        assert_eq!(tree.element_of(id), Some(7));

        tree.set_root_scope(Some(3));
        let id = tree.instantiate_bound(&template, None, 11).unwrap();
        assert_eq!(tree.element_of(id), Some(3));
        assert_eq!(log.borrow().last(), Some(&Event::Applied(3, 11)));
    }
}
