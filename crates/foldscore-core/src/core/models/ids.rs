use slotmap::new_key_type;

new_key_type! {
    /// Arena key of an [`Atom`](super::atom::Atom) inside a
    /// [`Conformation`](super::conformation::Conformation).
    pub struct AtomId;
}
