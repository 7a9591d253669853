use bitflags::bitflags;

bitflags! {
    /// Operator capabilities an object type advertises.
    ///
    /// The checker uses these to decide which operators may be applied to an
    /// object operand; the runtime still dispatches through declared overloads.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct Traits: u16 {
        const ADDER = 1;
        const SUBTRACTOR = 1 << 1;
        const NEGATER = 1 << 2;
        const MULTIPLIER = 1 << 3;
        const DIVIDER = 1 << 4;
        const MODDER = 1 << 5;
        const COMPARER = 1 << 6;
        const INDEXER = 1 << 7;
        const SIZER = 1 << 8;
        const CONTAINER = 1 << 9;
        const FIELD_TESTER = 1 << 10;
    }
}
