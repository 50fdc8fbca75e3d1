//! Persistent per-contact tangential state, keyed by stable participant
//! identities rather than object identity (§4.5, §9).

use crate::agent::AgentId;
use crate::wall::WallId;
use nalgebra::Vector2;
use std::collections::BTreeMap;

/// A stable key identifying one contact, usable across sub-steps and coarse
/// steps regardless of any internal reorganization of agents or shapes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContactKey {
    /// An agent–agent contact between shape `shape_a` of `agent_a` and shape
    /// `shape_b` of `agent_b`, with `agent_a < agent_b` enforced by
    /// [`Self::agent_agent`].
    AgentAgent {
        agent_a: u64,
        agent_b: u64,
        shape_a: usize,
        shape_b: usize,
    },
    /// An agent–wall contact between shape `shape` of `agent` and segment
    /// `corner` (the index of its starting corner) of `wall`.
    AgentWall {
        agent: u64,
        shape: usize,
        wall: u64,
        corner: usize,
    },
}

impl ContactKey {
    /// Builds the key for a contact between two agents' shapes, canonicalizing
    /// the order so the same key results regardless of which agent is probed
    /// first.
    pub fn agent_agent(agent_i: AgentId, shape_i: usize, agent_j: AgentId, shape_j: usize) -> Self {
        let (agent_a, shape_a, agent_b, shape_b) = if agent_i.0 < agent_j.0 {
            (agent_i.0, shape_i, agent_j.0, shape_j)
        } else {
            (agent_j.0, shape_j, agent_i.0, shape_i)
        };
        Self::AgentAgent {
            agent_a,
            agent_b,
            shape_a,
            shape_b,
        }
    }

    pub fn agent_wall(agent: AgentId, shape: usize, wall: WallId, corner: usize) -> Self {
        Self::AgentWall {
            agent: agent.0,
            shape,
            wall: wall.0,
            corner,
        }
    }
}

/// The persistent state of one contact: the accumulated tangential relative
/// displacement `ξ` and the force magnitudes reported for the last sub-step
/// in which the contact was active.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactRecord {
    pub tangential_displacement: Vector2<f64>,
    /// Magnitude of the non-attractive normal force (always ≥ 0).
    pub normal_force: f64,
    /// Magnitude of the tangential force.
    pub tangential_force: f64,
    /// The sub-step counter value at which this contact was last active. `0`
    /// means never active.
    last_active_substep: u64,
    touched_since_sweep: bool,
}

impl ContactRecord {
    fn fresh() -> Self {
        Self {
            tangential_displacement: Vector2::zeros(),
            normal_force: 0.0,
            tangential_force: 0.0,
            last_active_substep: 0,
            touched_since_sweep: false,
        }
    }
}

/// A mapping from [`ContactKey`] to [`ContactRecord`], backed by a
/// [`BTreeMap`] so that iteration order is always the ascending lexicographic
/// key order the determinism requirement in §4.7 calls for.
#[derive(Clone, Debug, Default)]
pub struct ContactBook {
    records: BTreeMap<ContactKey, ContactRecord>,
    substep_counter: u64,
}

impl ContactBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of a new mechanical sub-step. Must be called exactly
    /// once per sub-step, before any call to [`Self::activate`] for that
    /// sub-step.
    pub fn begin_substep(&mut self) {
        self.substep_counter += 1;
    }

    /// Looks up (creating if absent) the record for `key` and marks it alive
    /// for the current sub-step.
    ///
    /// If the contact was not active in the immediately preceding sub-step —
    /// whether because it is brand new or because overlap was momentarily
    /// lost — its tangential displacement is reset to zero before being
    /// returned, per §4.5.
    pub fn activate(&mut self, key: ContactKey) -> &mut ContactRecord {
        let current_substep = self.substep_counter;
        let record = self.records.entry(key).or_insert_with(ContactRecord::fresh);
        if record.last_active_substep + 1 != current_substep {
            record.tangential_displacement = Vector2::zeros();
        }
        record.last_active_substep = current_substep;
        record.touched_since_sweep = true;
        record
    }

    pub fn get(&self, key: &ContactKey) -> Option<&ContactRecord> {
        self.records.get(key)
    }

    /// Pre-populates a contact record from a previously persisted state,
    /// e.g. loaded from an `AgentInteractions.xml` file written by an
    /// earlier call. The record is treated as active as of the current
    /// sub-step counter, so a call to [`Self::activate`] for the same key
    /// during the very first sub-step of this book's lifetime sees it as
    /// continuously active and does not reset its tangential displacement.
    pub fn seed(
        &mut self,
        key: ContactKey,
        tangential_displacement: Vector2<f64>,
        normal_force: f64,
        tangential_force: f64,
    ) {
        self.records.insert(
            key,
            ContactRecord {
                tangential_displacement,
                normal_force,
                tangential_force,
                last_active_substep: self.substep_counter,
                touched_since_sweep: false,
            },
        );
    }

    /// Removes every record not touched by [`Self::activate`] since the
    /// previous call to `sweep`, i.e. every contact that never overlapped
    /// during the whole coarse step just completed. Must be called exactly
    /// once, at the end of a coarse step.
    pub fn sweep(&mut self) {
        self.records.retain(|_, record| record.touched_since_sweep);
        for record in self.records.values_mut() {
            record.touched_since_sweep = false;
        }
    }

    /// Iterates over the live contacts in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ContactKey, &ContactRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_keys_canonicalize_agent_order() {
        let a = AgentId(3);
        let b = AgentId(7);
        assert_eq!(
            ContactKey::agent_agent(a, 0, b, 1),
            ContactKey::agent_agent(b, 1, a, 0)
        );
    }

    #[test]
    fn a_contact_missed_for_one_substep_resets_its_tangential_state() {
        let mut book = ContactBook::new();
        let key = ContactKey::agent_wall(AgentId(1), 0, WallId(0), 0);

        book.begin_substep();
        book.activate(key).tangential_displacement = Vector2::new(1.0, 0.0);

        book.begin_substep();
        book.activate(key).tangential_displacement = Vector2::new(2.0, 0.0);
        assert_eq!(
            book.get(&key).unwrap().tangential_displacement,
            Vector2::new(2.0, 0.0)
        );

        // Skip a sub-step without activating: the next activation should see
        // a reset, since the contact was not active in the immediately
        // preceding sub-step.
        book.begin_substep();
        book.begin_substep();
        assert_eq!(book.activate(key).tangential_displacement, Vector2::zeros());
    }

    #[test]
    fn sweep_drops_contacts_untouched_during_the_coarse_step() {
        let mut book = ContactBook::new();
        let alive = ContactKey::agent_wall(AgentId(1), 0, WallId(0), 0);
        let gone = ContactKey::agent_wall(AgentId(2), 0, WallId(0), 1);

        book.begin_substep();
        book.activate(alive);
        book.activate(gone);

        book.sweep();
        assert_eq!(book.len(), 2);

        book.begin_substep();
        book.activate(alive);
        book.sweep();

        assert_eq!(book.len(), 1);
        assert!(book.get(&alive).is_some());
        assert!(book.get(&gone).is_none());
    }

    #[test]
    fn a_seeded_contact_survives_its_first_activation_without_resetting() {
        let mut book = ContactBook::new();
        let key = ContactKey::agent_wall(AgentId(1), 0, WallId(0), 0);
        book.seed(key, Vector2::new(0.3, -0.1), 12.0, 4.0);

        book.begin_substep();
        let record = book.activate(key);
        assert_eq!(record.tangential_displacement, Vector2::new(0.3, -0.1));
    }
}
