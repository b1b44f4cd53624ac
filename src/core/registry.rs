use crate::client::Client;

use winsys::window::Window;

/// Stable handle to a client slot in the [`Registry`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(usize);

/// Owns every managed client and keeps two orderings over them: the
/// insertion order used for tiling (`clients`) and the focus history
/// (`stack`). Both orderings are head-first.
pub struct Registry {
    slots: Vec<Option<Client>>,
    free: Vec<usize>,
    clients: Vec<ClientId>,
    stack: Vec<ClientId>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            slots: Vec::with_capacity(32),
            free: Vec::new(),
            clients: Vec::with_capacity(32),
            stack: Vec::with_capacity(32),
        }
    }

    /// Takes ownership of a client without placing it in either ordering.
    pub fn insert(
        &mut self,
        client: Client,
    ) -> ClientId {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(client);
                ClientId(index)
            },
            None => {
                self.slots.push(Some(client));
                ClientId(self.slots.len() - 1)
            },
        }
    }

    /// Releases a client, detaching it from both orderings first.
    pub fn remove(
        &mut self,
        id: ClientId,
    ) -> Option<Client> {
        self.detach(id);
        self.detach_stack(id);

        let client = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);

        Some(client)
    }

    #[inline]
    pub fn get(
        &self,
        id: ClientId,
    ) -> Option<&Client> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(
        &mut self,
        id: ClientId,
    ) -> Option<&mut Client> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    #[inline]
    pub fn contains(
        &self,
        id: ClientId,
    ) -> bool {
        self.get(id).is_some()
    }

    pub fn attach(
        &mut self,
        id: ClientId,
    ) {
        if self.contains(id) && !self.clients.contains(&id) {
            self.clients.insert(0, id);
        }
    }

    /// Places `id` directly after `after` in the insertion order.
    pub fn attach_after(
        &mut self,
        id: ClientId,
        after: ClientId,
    ) {
        if !self.contains(id) || id == after {
            return;
        }

        self.detach(id);

        match self.clients.iter().position(|&other| other == after) {
            Some(index) => self.clients.insert(index + 1, id),
            None => self.clients.insert(0, id),
        }
    }

    pub fn detach(
        &mut self,
        id: ClientId,
    ) {
        self.clients.retain(|&other| other != id);
    }

    pub fn attach_stack(
        &mut self,
        id: ClientId,
    ) {
        if self.contains(id) && !self.stack.contains(&id) {
            self.stack.insert(0, id);
        }
    }

    pub fn detach_stack(
        &mut self,
        id: ClientId,
    ) {
        self.stack.retain(|&other| other != id);
    }

    #[inline]
    pub fn clients(&self) -> &[ClientId] {
        &self.clients
    }

    #[inline]
    pub fn stack(&self) -> &[ClientId] {
        &self.stack
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClientId, &Client)> {
        self.clients
            .iter()
            .filter_map(move |&id| self.get(id).map(|client| (id, client)))
    }

    pub fn find_by_window(
        &self,
        window: Window,
    ) -> Option<ClientId> {
        self.clients
            .iter()
            .copied()
            .find(|&id| self.get(id).map_or(false, |client| client.window() == window))
    }

    pub fn first_visible_in_stack(
        &self,
        tagset: u32,
    ) -> Option<ClientId> {
        self.stack
            .iter()
            .copied()
            .find(|&id| self.get(id).map_or(false, |client| client.is_visible(tagset)))
    }

    /// Visible, non-floating clients in insertion order.
    pub fn tiled(
        &self,
        tagset: u32,
    ) -> Vec<ClientId> {
        self.iter()
            .filter(|(_, client)| client.is_tiled(tagset))
            .map(|(id, _)| id)
            .collect()
    }

    /// The first tiled client strictly after `id` in insertion order.
    pub fn next_tiled_after(
        &self,
        id: ClientId,
        tagset: u32,
    ) -> Option<ClientId> {
        let index = self.clients.iter().position(|&other| other == id)?;

        self.clients[index + 1..]
            .iter()
            .copied()
            .find(|&other| self.get(other).map_or(false, |client| client.is_tiled(tagset)))
    }

    pub fn windows(&self) -> Vec<Window> {
        self.iter().map(|(_, client)| client.window()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use winsys::geometry::Region;

    fn client(
        window: Window,
        tags: u32,
    ) -> Client {
        let mut client = Client::new(window, Region::new(0, 0, 100, 100), 1);
        client.set_tags(tags);
        client
    }

    fn is_unique(ids: &[ClientId]) -> bool {
        let mut sorted = ids.to_vec();
        sorted.sort();
        sorted.dedup();
        sorted.len() == ids.len()
    }

    #[test]
    fn orderings_never_hold_duplicates() {
        let mut registry = Registry::new();
        let ids: Vec<ClientId> = (1..=4).map(|w| registry.insert(client(w, 1))).collect();

        for &id in &ids {
            registry.attach(id);
            registry.attach_stack(id);
            registry.attach(id);
            registry.attach_stack(id);
        }

        registry.detach(ids[1]);
        registry.attach(ids[1]);
        registry.attach_after(ids[0], ids[2]);
        registry.detach_stack(ids[3]);
        registry.attach_stack(ids[3]);

        assert!(is_unique(registry.clients()));
        assert!(is_unique(registry.stack()));
        assert_eq!(registry.clients().len(), 4);
        assert_eq!(registry.stack().len(), 4);
    }

    #[test]
    fn attach_inserts_at_head() {
        let mut registry = Registry::new();
        let a = registry.insert(client(1, 1));
        let b = registry.insert(client(2, 1));

        registry.attach(a);
        registry.attach(b);

        assert_eq!(registry.clients(), &[b, a]);
    }

    #[test]
    fn removal_detaches_and_recycles_slot() {
        let mut registry = Registry::new();
        let a = registry.insert(client(1, 1));
        registry.attach(a);
        registry.attach_stack(a);

        assert!(registry.remove(a).is_some());
        assert!(registry.clients().is_empty());
        assert!(registry.stack().is_empty());
        assert!(registry.remove(a).is_none());

        let b = registry.insert(client(2, 1));
        assert_eq!(registry.get(b).map(Client::window), Some(2));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut registry = Registry::new();
        let ghost = ClientId(7);

        registry.attach(ghost);
        registry.attach_stack(ghost);
        registry.detach(ghost);

        assert!(registry.clients().is_empty());
        assert_eq!(registry.find_by_window(7), None);
    }

    #[test]
    fn first_visible_skips_hidden_clients() {
        let mut registry = Registry::new();
        let hidden = registry.insert(client(1, 0b10));
        let shown = registry.insert(client(2, 0b01));

        registry.attach_stack(shown);
        registry.attach_stack(hidden);

        assert_eq!(registry.first_visible_in_stack(0b01), Some(shown));
        assert_eq!(registry.first_visible_in_stack(0b100), None);
    }

    #[test]
    fn next_tiled_skips_floating() {
        let mut registry = Registry::new();
        let a = registry.insert(client(1, 1));
        let mut floating = client(2, 1);
        floating.set_floating(true);
        let b = registry.insert(floating);
        let c = registry.insert(client(3, 1));

        registry.attach(c);
        registry.attach(b);
        registry.attach(a);

        assert_eq!(registry.next_tiled_after(a, 1), Some(c));
        assert_eq!(registry.next_tiled_after(c, 1), None);
        assert_eq!(registry.tiled(1), vec![a, c]);
    }
}
