use crate::value::{Declaration, ParamSpec, ParamValue, ParamValues};
use crate::ParamError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Handle returned by [`ParamStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

#[derive(Debug, Clone)]
struct Param {
    owner: String,
    spec: ParamSpec,
    value: ParamValue,
    /// Store revision at which `value` last changed.
    revision: u64,
}

#[derive(Debug, Clone)]
struct Subscription {
    keys: Vec<String>,
    /// Store revision observed by the last poll; `None` until the first poll.
    seen: Option<u64>,
}

/// Read-only view of one declared parameter, for panels and inspectors.
#[derive(Debug, Clone, Copy)]
pub struct ParamEntry<'a> {
    pub name: &'a str,
    pub owner: &'a str,
    pub spec: &'a ParamSpec,
    pub value: ParamValue,
}

/// Parameter store shared by the panel (single writer) and scene components (readers).
///
/// Not a global: the application owns one and lends it to whoever declares or reads.
/// BTreeMap keeps panel ordering and snapshots deterministic.
#[derive(Debug, Clone, Default)]
pub struct ParamStore {
    params: BTreeMap<String, Param>,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
    revision: u64,
    next_subscription: u64,
}

impl ParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every key of `decl` and return the current values of those keys.
    ///
    /// Keys already owned by the same declaration keep their current values. A key owned
    /// by another declaration rejects the whole declaration; nothing is registered.
    pub fn declare(&mut self, decl: &Declaration) -> Result<ParamValues, ParamError> {
        for (name, spec) in decl.entries() {
            if let Some(existing) = self.params.get(name) {
                if existing.owner != decl.owner() {
                    return Err(ParamError::NameCollision {
                        name: name.clone(),
                        owner: existing.owner.clone(),
                    });
                }
            }
            if let Some(range) = spec.range() {
                range
                    .validate()
                    .map_err(|reason| ParamError::InvalidRange {
                        name: name.clone(),
                        reason,
                    })?;
            }
        }

        for (name, spec) in decl.entries() {
            if self.params.contains_key(name) {
                continue;
            }
            let value = match (spec.default_value(), spec.range()) {
                (ParamValue::Number(v), Some(range)) => ParamValue::Number(range.constrain(v)),
                (v, _) => v,
            };
            self.revision += 1;
            self.params.insert(
                name.clone(),
                Param {
                    owner: decl.owner().to_string(),
                    spec: spec.clone(),
                    value,
                    revision: self.revision,
                },
            );
            tracing::debug!(name = %name, owner = decl.owner(), %value, "parameter declared");
        }

        Ok(self.values_of(decl.keys()))
    }

    /// Write a value as the panel would. Numeric values are clamped and snapped to the
    /// declared range; the stored value is returned.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<ParamValue, ParamError> {
        let Some(param) = self.params.get_mut(name) else {
            tracing::warn!(name, "rejected write to undeclared parameter");
            return Err(ParamError::Unknown(name.to_string()));
        };

        let stored = match (&param.spec, value) {
            (ParamSpec::Number { range, .. }, ParamValue::Number(v)) => {
                if v.is_nan() {
                    tracing::warn!(name, "rejected NaN parameter write");
                    return Err(ParamError::NotANumber(name.to_string()));
                }
                let constrained = range.map_or(v, |r| r.constrain(v));
                if constrained != v {
                    tracing::debug!(name, requested = v, stored = constrained, "value constrained");
                }
                ParamValue::Number(constrained)
            }
            (ParamSpec::Color { .. }, ParamValue::Color(c)) => ParamValue::Color(c),
            (spec, v) => {
                let expected = spec.default_value().kind_name();
                tracing::warn!(name, got = v.kind_name(), expected, "rejected parameter write");
                return Err(ParamError::TypeMismatch {
                    name: name.to_string(),
                    expected,
                });
            }
        };

        if stored != param.value {
            self.revision += 1;
            param.value = stored;
            param.revision = self.revision;
            tracing::debug!(name, value = %stored, "parameter changed");
        }
        Ok(stored)
    }

    pub fn set_number(&mut self, name: &str, value: f64) -> Result<f64, ParamError> {
        self.set(name, ParamValue::Number(value))
            .map(|v| v.as_number().unwrap_or(value))
    }

    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.params.get(name).map(|p| p.value)
    }

    /// Current values of the named keys; undeclared names are skipped.
    pub fn values_of<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> ParamValues {
        let mut values = ParamValues::new();
        for key in keys {
            if let Some(p) = self.params.get(key) {
                values.insert(key, p.value);
            }
        }
        values
    }

    /// Every declared value.
    pub fn snapshot(&self) -> ParamValues {
        self.values_of(self.params.keys().map(String::as_str))
    }

    pub fn entries(&self) -> impl Iterator<Item = ParamEntry<'_>> {
        self.params.iter().map(|(name, p)| ParamEntry {
            name,
            owner: &p.owner,
            spec: &p.spec,
            value: p.value,
        })
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Subscribe to a set of keys. The first poll always yields the current values.
    pub fn subscribe<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.insert(
            id,
            Subscription {
                keys: keys.into_iter().map(str::to_string).collect(),
                seen: None,
            },
        );
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(&id).is_some()
    }

    /// Values of the subscribed keys if any of them changed since the last poll.
    pub fn poll(&mut self, id: SubscriptionId) -> Result<Option<ParamValues>, ParamError> {
        let sub = self
            .subscriptions
            .get(&id)
            .ok_or(ParamError::UnknownSubscription(id))?;

        let dirty = match sub.seen {
            None => true,
            Some(seen) => sub
                .keys
                .iter()
                .filter_map(|k| self.params.get(k))
                .any(|p| p.revision > seen),
        };
        if !dirty {
            return Ok(None);
        }

        let values = self.values_of(sub.keys.iter().map(String::as_str));
        let revision = self.revision;
        if let Some(sub) = self.subscriptions.get_mut(&id) {
            sub.seen = Some(revision);
        }
        Ok(Some(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapestage_common::Color;

    fn light_decl() -> Declaration {
        Declaration::new("light")
            .color("lightColor", Color::WHITE)
            .ranged("lightIntensity", 0.5, 0.0, 5.0, 0.1)
    }

    fn knot_decl() -> Declaration {
        Declaration::new("knot")
            .color("color", Color::LIGHTBLUE)
            .ranged("radius", 0.5, 0.1, 3.0, 0.1)
    }

    #[test]
    fn declare_returns_defaults() {
        let mut store = ParamStore::new();
        let values = store.declare(&light_decl()).unwrap();
        assert_eq!(values.color("lightColor"), Some(Color::WHITE));
        assert_eq!(values.number("lightIntensity"), Some(0.5));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn disjoint_declarations_coexist() {
        let mut store = ParamStore::new();
        store.declare(&light_decl()).unwrap();
        store.declare(&knot_decl()).unwrap();
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn redeclare_by_same_owner_keeps_current_value() {
        let mut store = ParamStore::new();
        store.declare(&light_decl()).unwrap();
        store.set_number("lightIntensity", 2.0).unwrap();
        let values = store.declare(&light_decl()).unwrap();
        assert_eq!(values.number("lightIntensity"), Some(2.0));
    }

    #[test]
    fn colliding_declaration_is_rejected_atomically() {
        let mut store = ParamStore::new();
        store.declare(&knot_decl()).unwrap();
        let other = Declaration::new("other")
            .number("fresh", 1.0)
            .color("color", Color::WHITE);
        let err = store.declare(&other).unwrap_err();
        assert!(matches!(err, ParamError::NameCollision { ref owner, .. } if owner == "knot"));
        assert!(store.get("fresh").is_none());
    }

    #[test]
    fn invalid_range_is_rejected() {
        let mut store = ParamStore::new();
        let bad = Declaration::new("bad").ranged("x", 1.0, 2.0, 1.0, 0.1);
        assert!(matches!(
            store.declare(&bad),
            Err(ParamError::InvalidRange { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn default_outside_range_is_constrained() {
        let mut store = ParamStore::new();
        let decl = Declaration::new("d").ranged("x", 9.0, 0.0, 5.0, 0.1);
        let values = store.declare(&decl).unwrap();
        assert_eq!(values.number("x"), Some(5.0));
    }

    #[test]
    fn set_out_of_range_is_clamped() {
        let mut store = ParamStore::new();
        store.declare(&light_decl()).unwrap();
        assert_eq!(store.set_number("lightIntensity", 42.0).unwrap(), 5.0);
        assert_eq!(store.set_number("lightIntensity", -1.0).unwrap(), 0.0);
        for requested in [-100.0, -0.01, 0.0, 2.55, 4.99, 5.0, 5.01, 1e9] {
            let stored = store.set_number("lightIntensity", requested).unwrap();
            assert!((0.0..=5.0).contains(&stored), "{requested} stored as {stored}");
        }
    }

    #[test]
    fn set_in_range_is_exact() {
        let mut store = ParamStore::new();
        store.declare(&light_decl()).unwrap();
        assert_eq!(store.set_number("lightIntensity", 3.0).unwrap(), 3.0);
        assert_eq!(store.get("lightIntensity"), Some(ParamValue::Number(3.0)));
    }

    #[test]
    fn unranged_number_is_stored_verbatim() {
        let mut store = ParamStore::new();
        store.declare(&Declaration::new("d").number("free", 1.0)).unwrap();
        assert_eq!(store.set_number("free", -123.456).unwrap(), -123.456);
    }

    #[test]
    fn type_mismatch_unknown_and_nan_are_errors() {
        let mut store = ParamStore::new();
        store.declare(&light_decl()).unwrap();
        assert!(matches!(
            store.set("lightColor", ParamValue::Number(1.0)),
            Err(ParamError::TypeMismatch { expected: "color", .. })
        ));
        assert!(matches!(
            store.set("nope", ParamValue::Number(1.0)),
            Err(ParamError::Unknown(_))
        ));
        assert!(matches!(
            store.set_number("lightIntensity", f64::NAN),
            Err(ParamError::NotANumber(_))
        ));
        assert_eq!(store.get("lightIntensity"), Some(ParamValue::Number(0.5)));
    }

    #[test]
    fn first_poll_yields_then_quiet() {
        let mut store = ParamStore::new();
        store.declare(&light_decl()).unwrap();
        let sub = store.subscribe(["lightColor", "lightIntensity"]);
        let first = store.poll(sub).unwrap().unwrap();
        assert_eq!(first.len(), 2);
        assert!(store.poll(sub).unwrap().is_none());
    }

    #[test]
    fn poll_sees_only_subscribed_keys() {
        let mut store = ParamStore::new();
        store.declare(&light_decl()).unwrap();
        store.declare(&knot_decl()).unwrap();
        let light = store.subscribe(light_decl().keys());
        let knot = store.subscribe(knot_decl().keys());
        store.poll(light).unwrap();
        store.poll(knot).unwrap();

        store.set_number("radius", 1.5).unwrap();
        assert!(store.poll(light).unwrap().is_none());
        let knot_values = store.poll(knot).unwrap().unwrap();
        assert_eq!(knot_values.number("radius"), Some(1.5));
        assert!(store.poll(knot).unwrap().is_none());
    }

    #[test]
    fn unchanged_write_does_not_notify() {
        let mut store = ParamStore::new();
        store.declare(&light_decl()).unwrap();
        let sub = store.subscribe(["lightIntensity"]);
        store.poll(sub).unwrap();

        store.set_number("lightIntensity", 9.0).unwrap();
        assert!(store.poll(sub).unwrap().is_some());
        // clamps to the same 5.0 again
        store.set_number("lightIntensity", 7.0).unwrap();
        assert!(store.poll(sub).unwrap().is_none());
    }

    #[test]
    fn unsubscribe_invalidates_handle() {
        let mut store = ParamStore::new();
        let sub = store.subscribe(["x"]);
        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        assert!(matches!(
            store.poll(sub),
            Err(ParamError::UnknownSubscription(_))
        ));
    }

    #[test]
    fn entries_are_name_ordered() {
        let mut store = ParamStore::new();
        store.declare(&light_decl()).unwrap();
        store.declare(&knot_decl()).unwrap();
        let names: Vec<&str> = store.entries().map(|e| e.name).collect();
        assert_eq!(names, ["color", "lightColor", "lightIntensity", "radius"]);
    }
}
