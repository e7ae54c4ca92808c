// ── Row actions ──
//
// Action descriptors are declared once per resource; `items(record)` turns
// them into the concrete menu for one row.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Record predicate.
pub type Predicate<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// Click handler producing `O`.
pub type Handler<R, O> = Arc<dyn Fn(&R) -> O + Send + Sync>;

/// A flag that is either fixed or computed from the record.
pub enum Availability<R> {
    Static(bool),
    When(Predicate<R>),
}

impl<R> Availability<R> {
    pub fn resolve(&self, record: &R) -> bool {
        match self {
            Self::Static(flag) => *flag,
            Self::When(predicate) => predicate(record),
        }
    }
}

impl<R> Clone for Availability<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(flag) => Self::Static(*flag),
            Self::When(predicate) => Self::When(Arc::clone(predicate)),
        }
    }
}

/// A row action declaration.
pub struct ActionDescriptor<R, O> {
    pub key: String,
    pub label: String,
    pub icon: Option<String>,
    pub danger: bool,
    pub disabled: Option<Availability<R>>,
    /// Visibility. Takes precedence over `condition`.
    pub should_show: Option<Availability<R>>,
    pub condition: Option<Predicate<R>>,
    pub handler: Option<Handler<R, O>>,
}

impl<R, O> Clone for ActionDescriptor<R, O> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            label: self.label.clone(),
            icon: self.icon.clone(),
            danger: self.danger,
            disabled: self.disabled.clone(),
            should_show: self.should_show.clone(),
            condition: self.condition.clone(),
            handler: self.handler.clone(),
        }
    }
}

impl<R, O> fmt::Debug for ActionDescriptor<R, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("icon", &self.icon)
            .field("danger", &self.danger)
            .finish_non_exhaustive()
    }
}

impl<R, O> ActionDescriptor<R, O> {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            icon: None,
            danger: false,
            disabled: None,
            should_show: None,
            condition: None,
            handler: None,
        }
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn danger(mut self) -> Self {
        self.danger = true;
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(Availability::Static(disabled));
        self
    }

    #[must_use]
    pub fn disabled_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.disabled = Some(Availability::When(Arc::new(predicate)));
        self
    }

    #[must_use]
    pub fn show(mut self, visible: bool) -> Self {
        self.should_show = Some(Availability::Static(visible));
        self
    }

    #[must_use]
    pub fn show_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.should_show = Some(Availability::When(Arc::new(predicate)));
        self
    }

    #[must_use]
    pub fn condition<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(predicate));
        self
    }

    #[must_use]
    pub fn on_click<F>(mut self, handler: F) -> Self
    where
        F: Fn(&R) -> O + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    fn is_visible(&self, record: &R) -> bool {
        if let Some(show) = &self.should_show {
            return show.resolve(record);
        }
        self.condition.as_ref().is_none_or(|condition| condition(record))
    }
}

/// The actions of one resource, bound to fallback handlers by key.
pub struct ActionMenu<R, O> {
    actions: Vec<ActionDescriptor<R, O>>,
    handlers: HashMap<String, Handler<R, O>>,
}

impl<R, O> ActionMenu<R, O> {
    /// The visible actions for `record`, in declaration order.
    pub fn items<'a>(&'a self, record: &'a R) -> Vec<ActionItem<'a, R, O>> {
        self.actions
            .iter()
            .filter(|action| action.is_visible(record))
            .map(|action| ActionItem {
                key: &action.key,
                label: &action.label,
                icon: action.icon.as_deref(),
                danger: action.danger,
                disabled: action.disabled.as_ref().is_some_and(|d| d.resolve(record)),
                record,
                handler: action.handler.as_ref().or_else(|| self.handlers.get(&action.key)),
            })
            .collect()
    }

    /// The visible action `key` for `record`.
    pub fn find<'a>(&'a self, record: &'a R, key: &str) -> Option<ActionItem<'a, R, O>> {
        self.items(record).into_iter().find(|item| item.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|a| a.key.as_str())
    }
}

/// One concrete menu entry for a record.
pub struct ActionItem<'a, R, O> {
    pub key: &'a str,
    pub label: &'a str,
    pub icon: Option<&'a str>,
    pub danger: bool,
    pub disabled: bool,
    record: &'a R,
    handler: Option<&'a Handler<R, O>>,
}

impl<R, O> fmt::Debug for ActionItem<'_, R, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionItem")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("danger", &self.danger)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

impl<R, O> ActionItem<'_, R, O> {
    /// Invoke the action on its record. Disabled entries and entries with
    /// no handler do nothing.
    pub fn click(&self) -> Option<O> {
        if self.disabled {
            return None;
        }
        self.handler.map(|handler| handler(self.record))
    }
}

/// Bind `actions` to `handlers`, used for actions without their own handler.
pub fn generate_action_items<R, O>(
    actions: Vec<ActionDescriptor<R, O>>,
    handlers: HashMap<String, Handler<R, O>>,
) -> ActionMenu<R, O> {
    ActionMenu { actions, handlers }
}
