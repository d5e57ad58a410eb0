// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The contracts a controller's visual element and its factory fulfil.

use core::any::Any;

/// A visual element owned by exactly one controller.
pub trait View<K> {
    /// Identity used for gesture registration.
    fn element(&self) -> K;

    /// Show or hide the element.
    fn set_visible(&mut self, visible: bool) {
        let _ = visible;
    }

    /// Release the element. Called once, when its controller closes.
    fn destroy(&mut self) {}
}

/// A view driven by a value-type model snapshot.
pub trait ModelView<K>: View<K> {
    /// The model type.
    type Model: 'static;

    /// Write `model` into the view.
    fn apply_model(&mut self, model: &Self::Model);
}

/// Factory for views, instantiated under a parent scope.
///
/// Any `Fn(&S) -> V` is a template.
pub trait Template<S> {
    /// The view this template produces.
    type View;

    /// Create a new view under `scope`.
    fn instantiate(&self, scope: &S) -> Self::View;
}

impl<S, V, F: Fn(&S) -> V> Template<S> for F {
    type View = V;

    fn instantiate(&self, scope: &S) -> V {
        self(scope)
    }
}

/// Type-erased view plus optional model, as stored in the tree.
pub(crate) trait Binding<K> {
    fn element(&self) -> K;
    fn set_visible(&mut self, visible: bool);
    fn destroy(&mut self);
    /// Apply the model, if any. Returns false for views without one.
    fn apply(&mut self) -> bool;
    fn view_any(&self) -> &dyn Any;
    fn view_any_mut(&mut self) -> &mut dyn Any;
    fn model_any(&self) -> Option<&dyn Any>;
    fn model_any_mut(&mut self) -> Option<&mut dyn Any>;
}

/// A view without a model.
pub(crate) struct Static<V>(pub(crate) V);

/// A view with its model.
pub(crate) struct Bound<V, M> {
    pub(crate) view: V,
    pub(crate) model: M,
}

impl<K, V: View<K> + 'static> Binding<K> for Static<V> {
    fn element(&self) -> K {
        self.0.element()
    }

    fn set_visible(&mut self, visible: bool) {
        self.0.set_visible(visible);
    }

    fn destroy(&mut self) {
        self.0.destroy();
    }

    fn apply(&mut self) -> bool {
        false
    }

    fn view_any(&self) -> &dyn Any {
        &self.0
    }

    fn view_any_mut(&mut self) -> &mut dyn Any {
        &mut self.0
    }

    fn model_any(&self) -> Option<&dyn Any> {
        None
    }

    fn model_any_mut(&mut self) -> Option<&mut dyn Any> {
        None
    }
}

impl<K, V, M> Binding<K> for Bound<V, M>
where
    V: ModelView<K, Model = M> + 'static,
    M: 'static,
{
    fn element(&self) -> K {
        self.view.element()
    }

    fn set_visible(&mut self, visible: bool) {
        self.view.set_visible(visible);
    }

    fn destroy(&mut self) {
        self.view.destroy();
    }

    fn apply(&mut self) -> bool {
        self.view.apply_model(&self.model);
        true
    }

    fn view_any(&self) -> &dyn Any {
        &self.view
    }

    fn view_any_mut(&mut self) -> &mut dyn Any {
        &mut self.view
    }

    fn model_any(&self) -> Option<&dyn Any> {
        Some(&self.model)
    }

    fn model_any_mut(&mut self) -> Option<&mut dyn Any> {
        Some(&mut self.model)
    }
}
