//! Integration tests for `rentacar`; see `tests/`.
