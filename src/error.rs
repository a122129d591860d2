// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::ContractStatus;

/// Rejections raised by the contract store. Surfaced through `anyhow` and
/// never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayrollError {
    #[error("Assignment {0} not found")]
    AssignmentNotFound(i64),

    #[error("Assignment {0} is archived; its daily records can no longer be changed")]
    ContractArchived(i64),

    #[error("Date {date} is outside the contract period {start} to {end}")]
    DateOutsideContract {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Assignment {id} is {status}, only ongoing assignments can be ended early")]
    NotOngoing { id: i64, status: ContractStatus },

    #[error("Assignment {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: i64,
        from: ContractStatus,
        to: ContractStatus,
    },

    #[error("Staff '{0}' already has an ongoing contract overlapping this start date")]
    OverlappingAssignment(String),

    #[error("Contract template '{0}' not found")]
    UnknownTemplate(String),

    #[error("Staff '{0}' not found")]
    UnknownStaff(String),

    #[error("Venue '{0}' not found")]
    UnknownVenue(String),
}
