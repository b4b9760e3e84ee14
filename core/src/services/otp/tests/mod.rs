//! Tests for the email OTP facade
