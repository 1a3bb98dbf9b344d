use super::{LogicError, SohlLogic};
use crate::modifier::ValueModifier;

/// Every node of a shared collection except the one being processed.
///
/// Built by [`with_siblings`], which splits the collection around the current
/// node, so a node can never reach itself through its siblings.
pub struct Siblings<'s, 'n> {
    before: &'s mut [&'n mut SohlLogic],
    after: &'s mut [&'n mut SohlLogic],
}

impl Siblings<'_, '_> {
    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &SohlLogic> {
        self.before
            .iter()
            .chain(self.after.iter())
            .map(|logic| &**logic)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SohlLogic> {
        self.before
            .iter_mut()
            .chain(self.after.iter_mut())
            .map(|logic| &mut **logic)
    }

    pub fn get(&self, id: &str) -> Option<&SohlLogic> {
        self.iter().find(|logic| logic.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut SohlLogic> {
        self.iter_mut().find(|logic| logic.id() == id)
    }

    /// Siblings whose `type` is `logic_type`.
    pub fn of_type<'a>(&'a self, logic_type: &'a str) -> impl Iterator<Item = &'a SohlLogic> {
        self.iter()
            .filter(move |logic| logic.logic_type() == logic_type)
    }

    /// Reads a sibling's modifier without checking its phase.
    pub fn peek_modifier(&self, logic_id: &str, name: &str) -> Option<&ValueModifier> {
        self.get(logic_id)?.peek_modifier(name)
    }

    pub fn modifier_mut(&mut self, logic_id: &str, name: &str) -> Option<&mut ValueModifier> {
        self.get_mut(logic_id)?.modifier_mut(name)
    }
}

/// Calls `f` on each node in order, with every other node as its siblings.
pub fn with_siblings<F>(nodes: &mut [&mut SohlLogic], mut f: F) -> Result<(), LogicError>
where
    F: FnMut(&mut SohlLogic, &mut Siblings<'_, '_>) -> Result<(), LogicError>,
{
    for index in 0..nodes.len() {
        let (before, rest) = nodes.split_at_mut(index);
        if let Some((current, after)) = rest.split_first_mut() {
            let mut siblings = Siblings { before, after };
            f(current, &mut siblings)?;
        }
    }
    Ok(())
}
