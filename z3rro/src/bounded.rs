use num::{BigUint, One};
use z3::{
    ast::{Ast, Bool, Int},
    Context,
};

use crate::SmtInvariant;

/// Creates [`BoundedUInt`] values of one fixed bit width.
#[derive(Debug, Clone, Copy)]
pub struct BoundedUIntFactory<'ctx> {
    ctx: &'ctx Context,
    bits: u32,
}

impl<'ctx> BoundedUIntFactory<'ctx> {
    pub fn new(ctx: &'ctx Context, bits: u32) -> Self {
        assert!(bits > 0, "bounded integers need at least one bit");
        BoundedUIntFactory { ctx, bits }
    }

    /// The largest representable value, `2^bits - 1`.
    pub fn max_value(&self) -> BigUint {
        (BigUint::one() << self.bits as usize) - BigUint::one()
    }

    /// The Z3 numeral for [`BoundedUIntFactory::max_value`].
    pub fn max_int(&self) -> Int<'ctx> {
        // numerals of any size are accepted by Z3's string constructor
        Int::from_str(self.ctx, &self.max_value().to_string())
            .expect("numerals are valid integers")
    }

    /// The bounded integer with the given Z3 constant name.
    pub fn named_const(&self, name: &str) -> BoundedUInt<'ctx> {
        self.unchecked_from_int(Int::new_const(self.ctx, name))
    }

    /// Wrap an integer without checking that it is in range. The range is
    /// only enforced through [`SmtInvariant::smt_invariant`].
    pub fn unchecked_from_int(&self, value: Int<'ctx>) -> BoundedUInt<'ctx> {
        BoundedUInt {
            factory: *self,
            value,
        }
    }
}

/// Z3's [`Int`] type, but restricted to the numbers `0..2^bits`. This is how
/// fixed-width unsigned machine integers (such as array indices) are modelled.
#[derive(Debug, Clone)]
pub struct BoundedUInt<'ctx> {
    factory: BoundedUIntFactory<'ctx>,
    value: Int<'ctx>,
}

impl<'ctx> BoundedUInt<'ctx> {
    pub fn as_int(&self) -> &Int<'ctx> {
        &self.value
    }
}

impl<'ctx> SmtInvariant<'ctx> for BoundedUInt<'ctx> {
    fn smt_invariant(&self) -> Option<Bool<'ctx>> {
        let ctx = self.factory.ctx;
        let zero = Int::from_u64(ctx, 0);
        let max = self.factory.max_int();
        Some(Bool::and(
            ctx,
            &[&self.value.ge(&zero), &self.value.le(&max)],
        ))
    }
}
