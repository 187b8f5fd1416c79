//! Bit-exact evaluation of the numeric instruction set: [`IntOp`] and
//! [`FloatOp`] (shared across both widths of their kind) plus [`CvtOp`]
//! (one evaluator arm per opcode, since destination width isn't recoverable
//! from the operand). Every trapping case returns [`Trap`] rather than
//! panicking — a malformed or adversarial module must never crash the host.

use crate::exec::{Trap, Value};
use crate::parse::{CvtOp, FloatOp, IntOp, NumKind};

/// Evaluates a unary or binary [`IntOp`] at the given [`NumKind`] (`I32` or
/// `I64`). `operands` holds the popped values in push order, i.e.
/// `operands[0]` was pushed first.
pub fn eval_int_op(kind: NumKind, op: IntOp, operands: &[Value]) -> Result<Value, Trap> {
	match kind {
		NumKind::I32 => eval_int_op_32(op, operands),
		NumKind::I64 => eval_int_op_64(op, operands),
		NumKind::F32 | NumKind::F64 => unreachable!("IntOp only decodes at I32/I64"),
	}
}

macro_rules! int_op_impl {
	($name:ident, $ty:ty, $uty:ty, $wide:ty, $ctor:ident) => {
		fn $name(op: IntOp, operands: &[Value]) -> Result<Value, Trap> {
			// Tests and relations always push an i32 regardless of operand
			// width; everything else stays at the operand's own width.
			if op == IntOp::Eqz {
				let a = operands[0].$ctor().expect("decoder guarantees operand width");
				return Ok(Value::from((a as $uty == 0) as i32));
			}
			if let IntOp::Clz | IntOp::Ctz | IntOp::Popcnt = op {
				let a = operands[0].$ctor().expect("decoder guarantees operand width");
				let ua = a as $uty;
				let result = match op {
					IntOp::Clz => ua.leading_zeros() as $uty,
					IntOp::Ctz => ua.trailing_zeros() as $uty,
					IntOp::Popcnt => ua.count_ones() as $uty,
					_ => unreachable!(),
				};
				return Ok(Value::from(result as $ty));
			}

			let a = operands[0].$ctor().expect("decoder guarantees operand width");
			let b = operands[1].$ctor().expect("decoder guarantees operand width");
			let ua = a as $uty;
			let ub = b as $uty;
			let shift = (ub as u32) % (<$ty>::BITS);

			match op {
				IntOp::Eq => return Ok(Value::from((ua == ub) as i32)),
				IntOp::Ne => return Ok(Value::from((ua != ub) as i32)),
				IntOp::LtS => return Ok(Value::from((a < b) as i32)),
				IntOp::LtU => return Ok(Value::from((ua < ub) as i32)),
				IntOp::GtS => return Ok(Value::from((a > b) as i32)),
				IntOp::GtU => return Ok(Value::from((ua > ub) as i32)),
				IntOp::LeS => return Ok(Value::from((a <= b) as i32)),
				IntOp::LeU => return Ok(Value::from((ua <= ub) as i32)),
				IntOp::GeS => return Ok(Value::from((a >= b) as i32)),
				IntOp::GeU => return Ok(Value::from((ua >= ub) as i32)),
				_ => {}
			}

			let result: $uty = match op {
				IntOp::Add => ua.wrapping_add(ub),
				IntOp::Sub => ua.wrapping_sub(ub),
				IntOp::Mul => ua.wrapping_mul(ub),
				IntOp::DivS => {
					if b == 0 {
						return Err(Trap::DivideByZero);
					}
					if a == <$ty>::MIN && b == -1 {
						return Err(Trap::IntegerOverflow);
					}
					(a.wrapping_div(b)) as $uty
				}
				IntOp::DivU => {
					if ub == 0 {
						return Err(Trap::DivideByZero);
					}
					ua.wrapping_div(ub)
				}
				IntOp::RemS => {
					if b == 0 {
						return Err(Trap::DivideByZero);
					}
					if a == <$ty>::MIN && b == -1 {
						0
					} else {
						(a.wrapping_rem(b)) as $uty
					}
				}
				IntOp::RemU => {
					if ub == 0 {
						return Err(Trap::DivideByZero);
					}
					ua.wrapping_rem(ub)
				}
				IntOp::And => ua & ub,
				IntOp::Or => ua | ub,
				IntOp::Xor => ua ^ ub,
				IntOp::Shl => ua.wrapping_shl(shift),
				IntOp::ShrS => ((a as $wide) >> shift) as $ty as $uty,
				IntOp::ShrU => ua.wrapping_shr(shift),
				IntOp::Rotl => ua.rotate_left(shift),
				IntOp::Rotr => ua.rotate_right(shift),
				IntOp::Eq
				| IntOp::Ne
				| IntOp::LtS
				| IntOp::LtU
				| IntOp::GtS
				| IntOp::GtU
				| IntOp::LeS
				| IntOp::LeU
				| IntOp::GeS
				| IntOp::GeU
				| IntOp::Clz
				| IntOp::Ctz
				| IntOp::Popcnt
				| IntOp::Eqz => unreachable!(),
			};
			Ok(Value::from(result as $ty))
		}
	};
}

int_op_impl!(eval_int_op_32, i32, u32, i32, as_i32);
int_op_impl!(eval_int_op_64, i64, u64, i64, as_i64);

/// Evaluates a unary or binary [`FloatOp`] at the given [`NumKind`] (`F32`
/// or `F64`). Relations and arithmetic follow IEEE-754 directly via Rust's
/// native float ops, except `min`/`max`/`nearest`, whose NaN-propagation and
/// round-to-even behavior WebAssembly pins down explicitly and Rust's own
/// `f32::min`/`round` do not match bit-for-bit.
pub fn eval_float_op(kind: NumKind, op: FloatOp, operands: &[Value]) -> Result<Value, Trap> {
	match kind {
		NumKind::F32 => eval_float_op_32(op, operands),
		NumKind::F64 => eval_float_op_64(op, operands),
		NumKind::I32 | NumKind::I64 => unreachable!("FloatOp only decodes at F32/F64"),
	}
}

macro_rules! float_op_impl {
	($name:ident, $ty:ty, $ctor:ident) => {
		fn $name(op: FloatOp, operands: &[Value]) -> Result<Value, Trap> {
			let a = operands[0].$ctor().expect("decoder guarantees operand width");
			if let FloatOp::Abs
			| FloatOp::Neg
			| FloatOp::Ceil
			| FloatOp::Floor
			| FloatOp::Trunc
			| FloatOp::Nearest
			| FloatOp::Sqrt = op
			{
				let result = match op {
					FloatOp::Abs => a.abs(),
					FloatOp::Neg => -a,
					FloatOp::Ceil => a.ceil(),
					FloatOp::Floor => a.floor(),
					FloatOp::Trunc => a.trunc(),
					FloatOp::Nearest => round_ties_even(a),
					FloatOp::Sqrt => a.sqrt(),
					_ => unreachable!(),
				};
				return Ok(Value::from(result));
			}

			let b = operands[1].$ctor().expect("decoder guarantees operand width");
			match op {
				FloatOp::Add => Ok(Value::from(a + b)),
				FloatOp::Sub => Ok(Value::from(a - b)),
				FloatOp::Mul => Ok(Value::from(a * b)),
				FloatOp::Div => Ok(Value::from(a / b)),
				FloatOp::Min => Ok(Value::from(wasm_min(a, b))),
				FloatOp::Max => Ok(Value::from(wasm_max(a, b))),
				FloatOp::Copysign => Ok(Value::from(a.copysign(b))),
				FloatOp::Eq => Ok(Value::from((a == b) as i32)),
				FloatOp::Ne => Ok(Value::from((a != b) as i32)),
				FloatOp::Lt => Ok(Value::from((a < b) as i32)),
				FloatOp::Gt => Ok(Value::from((a > b) as i32)),
				FloatOp::Le => Ok(Value::from((a <= b) as i32)),
				FloatOp::Ge => Ok(Value::from((a >= b) as i32)),
				_ => unreachable!(),
			}
		}
	};
}

float_op_impl!(eval_float_op_32, f32, as_f32);
float_op_impl!(eval_float_op_64, f64, as_f64);

/// NaN propagates; `min(-0, +0) == -0` and `max(-0, +0) == +0`, which
/// Rust's `f64::min`/`max` (which treat signed zeros as equal either way)
/// do not guarantee.
fn wasm_min<T: Float>(a: T, b: T) -> T {
	if a.is_nan() || b.is_nan() {
		return T::nan();
	}
	if a.is_zero() && b.is_zero() {
		return if a.is_sign_negative() || b.is_sign_negative() { a.neg_zero() } else { a.pos_zero() };
	}
	if a < b {
		a
	} else {
		b
	}
}

fn wasm_max<T: Float>(a: T, b: T) -> T {
	if a.is_nan() || b.is_nan() {
		return T::nan();
	}
	if a.is_zero() && b.is_zero() {
		return if a.is_sign_positive() || b.is_sign_positive() { a.pos_zero() } else { a.neg_zero() };
	}
	if a > b {
		a
	} else {
		b
	}
}

/// Round-half-to-even, as `f32::round`/`f64::round` round half away from
/// zero instead.
fn round_ties_even<T: Float>(x: T) -> T {
	if !x.is_finite() || x.is_zero() {
		return x;
	}
	let floor = x.floor_t();
	let diff = x - floor;
	let half = T::from_f64(0.5);
	if diff < half {
		floor
	} else if diff > half {
		floor + T::from_f64(1.0)
	} else if floor.is_even() {
		floor
	} else {
		floor + T::from_f64(1.0)
	}
}

/// Small helper trait so `wasm_min`/`wasm_max`/`round_ties_even` can be
/// written once instead of twice for `f32` and `f64`.
trait Float: Copy + PartialOrd + std::ops::Sub<Output = Self> + std::ops::Add<Output = Self> {
	fn is_nan(self) -> bool;
	fn is_zero(self) -> bool;
	fn is_sign_negative(self) -> bool;
	fn is_sign_positive(self) -> bool;
	fn is_finite(self) -> bool;
	fn neg_zero(self) -> Self;
	fn pos_zero(self) -> Self;
	fn floor_t(self) -> Self;
	fn is_even(self) -> bool;
	fn nan() -> Self;
	fn from_f64(v: f64) -> Self;
}

macro_rules! float_trait_impl {
	($ty:ty) => {
		impl Float for $ty {
			fn is_nan(self) -> bool {
				<$ty>::is_nan(self)
			}
			fn is_zero(self) -> bool {
				self == 0.0
			}
			fn is_sign_negative(self) -> bool {
				<$ty>::is_sign_negative(self)
			}
			fn is_sign_positive(self) -> bool {
				<$ty>::is_sign_positive(self)
			}
			fn is_finite(self) -> bool {
				<$ty>::is_finite(self)
			}
			fn neg_zero(self) -> Self {
				-0.0
			}
			fn pos_zero(self) -> Self {
				0.0
			}
			fn floor_t(self) -> Self {
				self.floor()
			}
			fn is_even(self) -> bool {
				self % 2.0 == 0.0
			}
			fn nan() -> Self {
				<$ty>::NAN
			}
			fn from_f64(v: f64) -> Self {
				v as $ty
			}
		}
	};
}

float_trait_impl!(f32);
float_trait_impl!(f64);

/// Evaluates a [`CvtOp`]: conversions, truncations, and reinterpretations.
/// Truncating float-to-integer conversions trap on NaN and on magnitudes
/// that don't fit the destination width, per `spec.md`'s trunc semantics.
pub fn eval_cvt_op(op: CvtOp, operand: Value) -> Result<Value, Trap> {
	match op {
		CvtOp::I32WrapI64 => Ok(Value::from(operand.as_i64().unwrap() as i32)),

		CvtOp::I32TruncF32S => trunc_to_int::<f32, i32>(operand.as_f32().unwrap()).map(Value::from),
		CvtOp::I32TruncF32U => trunc_to_uint::<f32, u32>(operand.as_f32().unwrap()).map(Value::from),
		CvtOp::I32TruncF64S => trunc_to_int::<f64, i32>(operand.as_f64().unwrap()).map(Value::from),
		CvtOp::I32TruncF64U => trunc_to_uint::<f64, u32>(operand.as_f64().unwrap()).map(Value::from),

		CvtOp::I64ExtendI32S => Ok(Value::from(operand.as_i32().unwrap() as i64)),
		CvtOp::I64ExtendI32U => Ok(Value::from(operand.as_u32().unwrap() as u64)),
		CvtOp::I64TruncF32S => trunc_to_int::<f32, i64>(operand.as_f32().unwrap()).map(Value::from),
		CvtOp::I64TruncF32U => trunc_to_uint::<f32, u64>(operand.as_f32().unwrap()).map(Value::from),
		CvtOp::I64TruncF64S => trunc_to_int::<f64, i64>(operand.as_f64().unwrap()).map(Value::from),
		CvtOp::I64TruncF64U => trunc_to_uint::<f64, u64>(operand.as_f64().unwrap()).map(Value::from),

		CvtOp::F32ConvertI32S => Ok(Value::from(operand.as_i32().unwrap() as f32)),
		CvtOp::F32ConvertI32U => Ok(Value::from(operand.as_u32().unwrap() as f32)),
		CvtOp::F32ConvertI64S => Ok(Value::from(operand.as_i64().unwrap() as f32)),
		CvtOp::F32ConvertI64U => Ok(Value::from(operand.as_u64().unwrap() as f32)),
		CvtOp::F32DemoteF64 => Ok(Value::from(operand.as_f64().unwrap() as f32)),

		CvtOp::F64ConvertI32S => Ok(Value::from(operand.as_i32().unwrap() as f64)),
		CvtOp::F64ConvertI32U => Ok(Value::from(operand.as_u32().unwrap() as f64)),
		CvtOp::F64ConvertI64S => Ok(Value::from(operand.as_i64().unwrap() as f64)),
		CvtOp::F64ConvertI64U => Ok(Value::from(operand.as_u64().unwrap() as f64)),
		CvtOp::F64PromoteF32 => Ok(Value::from(operand.as_f32().unwrap() as f64)),

		CvtOp::I32ReinterpretF32 => Ok(Value::from(operand.as_f32().unwrap().to_bits())),
		CvtOp::I64ReinterpretF64 => Ok(Value::from(operand.as_f64().unwrap().to_bits())),
		CvtOp::F32ReinterpretI32 => Ok(Value::from(f32::from_bits(operand.as_u32().unwrap()))),
		CvtOp::F64ReinterpretI64 => Ok(Value::from(f64::from_bits(operand.as_u64().unwrap()))),

		CvtOp::I32Extend8S => Ok(Value::from(operand.as_i32().unwrap() as i8 as i32)),
		CvtOp::I32Extend16S => Ok(Value::from(operand.as_i32().unwrap() as i16 as i32)),
		CvtOp::I64Extend8S => Ok(Value::from(operand.as_i64().unwrap() as i8 as i64)),
		CvtOp::I64Extend16S => Ok(Value::from(operand.as_i64().unwrap() as i16 as i64)),
		CvtOp::I64Extend32S => Ok(Value::from(operand.as_i64().unwrap() as i32 as i64)),
	}
}

/// Truncates `src` toward zero into a signed `Dst`, trapping on NaN,
/// infinities, and magnitudes outside `Dst`'s representable range. The
/// bounds are taken in `f64` so both `i32` and `i64` destinations can share
/// one implementation without losing precision at the `i64` boundary (a
/// saturating-cast-then-narrow approach would silently accept out-of-range
/// `i64` truncations, since the saturated value is still a valid `i64`).
fn trunc_to_int<Src, Dst>(src: Src) -> Result<Dst, Trap>
where
	Src: Into<f64> + Copy,
	Dst: TryFromBounds,
{
	let v: f64 = src.into();
	if v.is_nan() {
		return Err(Trap::TruncOverflow);
	}
	let truncated = v.trunc();
	if truncated < Dst::MIN_F64 || truncated >= Dst::MAX_EXCLUSIVE_F64 {
		return Err(Trap::TruncOverflow);
	}
	Ok(Dst::from_truncated_f64(truncated))
}

/// As [`trunc_to_int`] but into an unsigned `Dst`.
fn trunc_to_uint<Src, Dst>(src: Src) -> Result<Dst, Trap>
where
	Src: Into<f64> + Copy,
	Dst: TryFromBoundsUnsigned,
{
	let v: f64 = src.into();
	if v.is_nan() {
		return Err(Trap::TruncOverflow);
	}
	let truncated = v.trunc();
	if truncated < 0.0 || truncated >= Dst::MAX_EXCLUSIVE_F64 {
		return Err(Trap::TruncOverflow);
	}
	Ok(Dst::from_truncated_f64(truncated))
}

/// Per-destination-width bounds and conversion for [`trunc_to_int`].
trait TryFromBounds: Sized {
	const MIN_F64: f64;
	const MAX_EXCLUSIVE_F64: f64;
	fn from_truncated_f64(v: f64) -> Self;
}

impl TryFromBounds for i32 {
	const MIN_F64: f64 = i32::MIN as f64;
	const MAX_EXCLUSIVE_F64: f64 = 2_147_483_648.0;
	fn from_truncated_f64(v: f64) -> Self {
		v as i32
	}
}

impl TryFromBounds for i64 {
	const MIN_F64: f64 = -9_223_372_036_854_775_808.0;
	const MAX_EXCLUSIVE_F64: f64 = 9_223_372_036_854_775_808.0;
	fn from_truncated_f64(v: f64) -> Self {
		v as i64
	}
}

/// Per-destination-width bound and conversion for [`trunc_to_uint`].
trait TryFromBoundsUnsigned: Sized {
	const MAX_EXCLUSIVE_F64: f64;
	fn from_truncated_f64(v: f64) -> Self;
}

impl TryFromBoundsUnsigned for u32 {
	const MAX_EXCLUSIVE_F64: f64 = 4_294_967_296.0;
	fn from_truncated_f64(v: f64) -> Self {
		v as u32
	}
}

impl TryFromBoundsUnsigned for u64 {
	const MAX_EXCLUSIVE_F64: f64 = 18_446_744_073_709_551_616.0;
	fn from_truncated_f64(v: f64) -> Self {
		v as u64
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn i32_div_u_treats_operands_as_unsigned() {
		// -1 as u32 is u32::MAX; dividing by 2 should use the unsigned value.
		let result = eval_int_op(NumKind::I32, IntOp::DivU, &[Value::from(-1i32), Value::from(2i32)]).unwrap();
		assert_eq!(result, Value::from(-1i32 as u32 as i32 / 2));
	}

	#[test]
	fn i64_rem_u_by_zero_traps() {
		let result = eval_int_op(NumKind::I64, IntOp::RemU, &[Value::from(1i64), Value::from(0i64)]);
		assert!(matches!(result, Err(Trap::DivideByZero)));
	}

	#[test]
	fn float_eq_is_false_for_nan() {
		let result = eval_float_op(NumKind::F64, FloatOp::Eq, &[Value::from(f64::NAN), Value::from(f64::NAN)]).unwrap();
		assert_eq!(result, Value::from(0i32));
	}

	#[test]
	fn float_lt_orders_normally() {
		let result = eval_float_op(NumKind::F32, FloatOp::Lt, &[Value::from(1.0f32), Value::from(2.0f32)]).unwrap();
		assert_eq!(result, Value::from(1i32));
	}

	#[test]
	fn trunc_i32_u_rejects_negative() {
		let result = eval_cvt_op(CvtOp::I32TruncF32U, Value::from(-1.0f32));
		assert!(matches!(result, Err(Trap::TruncOverflow)));
	}
}
