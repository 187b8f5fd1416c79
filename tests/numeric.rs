use wasmlite::exec::numeric::{eval_cvt_op, eval_float_op, eval_int_op};
use wasmlite::exec::{Trap, Value};
use wasmlite::parse::{CvtOp, FloatOp, IntOp, NumKind};

#[test]
fn i32_add_wraps() {
	let result = eval_int_op(NumKind::I32, IntOp::Add, &[Value::from(i32::MAX), Value::from(1i32)]).unwrap();
	assert_eq!(result, Value::from(i32::MIN));
}

#[test]
fn i32_div_s_by_zero_traps() {
	let result = eval_int_op(NumKind::I32, IntOp::DivS, &[Value::from(1i32), Value::from(0i32)]);
	assert!(matches!(result, Err(Trap::DivideByZero)));
}

#[test]
fn i32_div_s_min_by_neg_one_overflows() {
	let result = eval_int_op(NumKind::I32, IntOp::DivS, &[Value::from(i32::MIN), Value::from(-1i32)]);
	assert!(matches!(result, Err(Trap::IntegerOverflow)));
}

#[test]
fn i32_rem_s_min_by_neg_one_is_zero_not_a_trap() {
	let result = eval_int_op(NumKind::I32, IntOp::RemS, &[Value::from(i32::MIN), Value::from(-1i32)]).unwrap();
	assert_eq!(result, Value::from(0i32));
}

#[test]
fn comparisons_always_produce_i32_regardless_of_operand_width() {
	let result = eval_int_op(NumKind::I64, IntOp::LtS, &[Value::from(1i64), Value::from(2i64)]).unwrap();
	assert_eq!(result, Value::from(1i32));
	assert_eq!(result.val_type(), wasmlite::parse::ValType::I32);
}

#[test]
fn shift_amount_is_taken_modulo_width() {
	// i32.shl by 33 behaves like shl by 1.
	let result = eval_int_op(NumKind::I32, IntOp::Shl, &[Value::from(1i32), Value::from(33i32)]).unwrap();
	assert_eq!(result, Value::from(2i32));
}

#[test]
fn clz_ctz_popcnt_operate_on_unsigned_pattern() {
	assert_eq!(eval_int_op(NumKind::I32, IntOp::Clz, &[Value::from(1i32)]).unwrap(), Value::from(31i32));
	assert_eq!(eval_int_op(NumKind::I32, IntOp::Ctz, &[Value::from(8i32)]).unwrap(), Value::from(3i32));
	assert_eq!(eval_int_op(NumKind::I32, IntOp::Popcnt, &[Value::from(-1i32)]).unwrap(), Value::from(32i32));
}

#[test]
fn float_min_max_propagate_nan() {
	let nan = eval_float_op(NumKind::F32, FloatOp::Min, &[Value::from(f32::NAN), Value::from(1.0f32)]).unwrap();
	assert!(nan.as_f32().unwrap().is_nan());
}

#[test]
fn float_min_breaks_signed_zero_tie_toward_negative() {
	let result = eval_float_op(NumKind::F64, FloatOp::Min, &[Value::from(0.0f64), Value::from(-0.0f64)]).unwrap();
	assert!(result.as_f64().unwrap().is_sign_negative());
}

#[test]
fn float_max_breaks_signed_zero_tie_toward_positive() {
	let result = eval_float_op(NumKind::F64, FloatOp::Max, &[Value::from(0.0f64), Value::from(-0.0f64)]).unwrap();
	assert!(result.as_f64().unwrap().is_sign_positive());
}

#[test]
fn nearest_rounds_half_to_even() {
	let half_down = eval_float_op(NumKind::F64, FloatOp::Nearest, &[Value::from(2.5f64)]).unwrap();
	assert_eq!(half_down.as_f64().unwrap(), 2.0);
	let half_up = eval_float_op(NumKind::F64, FloatOp::Nearest, &[Value::from(3.5f64)]).unwrap();
	assert_eq!(half_up.as_f64().unwrap(), 4.0);
}

#[test]
fn copysign_takes_sign_bit_from_second_operand() {
	let result = eval_float_op(NumKind::F32, FloatOp::Copysign, &[Value::from(3.0f32), Value::from(-1.0f32)]).unwrap();
	assert_eq!(result.as_f32().unwrap(), -3.0);
}

#[test]
fn trunc_f32_s_overflow_traps() {
	let result = eval_cvt_op(CvtOp::I32TruncF32S, Value::from(1e10f32));
	assert!(matches!(result, Err(Trap::TruncOverflow)));
}

#[test]
fn trunc_f64_s_nan_traps() {
	let result = eval_cvt_op(CvtOp::I32TruncF64S, Value::from(f64::NAN));
	assert!(matches!(result, Err(Trap::TruncOverflow)));
}

#[test]
fn trunc_f64_s_to_i64_accepts_in_range_negative() {
	let result = eval_cvt_op(CvtOp::I64TruncF64S, Value::from(-9_223_372_036_854_775_000.0f64)).unwrap();
	assert!(result.as_i64().unwrap() < 0);
}

#[test]
fn trunc_f64_s_to_i64_rejects_out_of_range() {
	// Exactly 2^63 is out of i64's representable range (max is 2^63 - 1).
	let result = eval_cvt_op(CvtOp::I64TruncF64S, Value::from(9_223_372_036_854_775_808.0f64));
	assert!(matches!(result, Err(Trap::TruncOverflow)));
}

#[test]
fn wrap_i64_keeps_low_32_bits() {
	let result = eval_cvt_op(CvtOp::I32WrapI64, Value::from(0x1_0000_0001i64)).unwrap();
	assert_eq!(result, Value::from(1i32));
}

#[test]
fn sign_extend8_s_propagates_high_bit() {
	let result = eval_cvt_op(CvtOp::I32Extend8S, Value::from(0xFFi32)).unwrap();
	assert_eq!(result, Value::from(-1i32));
}

#[test]
fn reinterpret_is_bit_exact() {
	let result = eval_cvt_op(CvtOp::I32ReinterpretF32, Value::from(1.0f32)).unwrap();
	assert_eq!(result, Value::from(1.0f32.to_bits()));
}
