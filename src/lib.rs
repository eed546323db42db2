/*!
# Student Records

A small student-records service: a JSON API over a key-value store, with a
browser front end for listing, searching, editing, bulk CSV import and a
dashboard of summary charts.

## Overview

Every student is one hash in the store, kept under `student:<id>` with
eight text fields: name, age, email, phone, course, gender, address and
birthdate. The server never holds records between requests; every call
reads or writes the store directly.

## Architecture

### Frontend Layer
- **Technologies**: HTML, CSS, plain JavaScript
- **Key Components**:
  - Login page - Checks the admin pair and sets a flag in local storage
  - Student table - Lists, filters and sorts records by id
  - Add/Edit modals - Create and update single records
  - CSV modal - Previews an upload and adds its rows one by one
  - Dashboard - Summary figures and three charts

### Backend Layer
- **Technologies**: Rust, axum, tokio
- **Core Components**:
  - Store - Redis, or an in-process map with an optional snapshot file
  - Records - Field list and payload validation
  - Loader - CSV parsing and row normalisation
  - Dashboard - Course, gender and age-group counts
  - Graph - PNG charts with plotters
  - Downloader - CSV and XLSX export

## Modules

- **record**: Student fields, payloads and validation helpers
- **query**: Search attributes, filtering and id ordering
- **loader**: CSV import
- **dashboard**: Summary figures
- **downloader**: Export to CSV and XLSX
- **saving**: Snapshot files for the memory store
- **config**: Command line and environment settings
- **error**: Error type shared below the HTTP layer
- **store**: Storage trait and its backends
- **students**: Record, import, export and dashboard handlers
- **login**: Admin login and logout
- **graph**: Chart rendering
- **app**: Routing and middleware

## REST API Endpoints

- `POST /login`, `POST /logout` - Admin sign in and out
- `GET /students`, `POST /students` - List (optionally filtered) and create
- `GET|PUT|DELETE /students/{id}` - Read, partially update and remove
- `POST /students/import/preview`, `POST /students/import` - CSV upload
- `GET /students/export/{csv|xlsx}` - Download every record
- `GET /dashboard`, `GET /dashboard/charts/{chart}.png` - Summary and charts
*/

pub mod config;
pub mod dashboard;
pub mod downloader;
pub mod error;
pub mod loader;
pub mod query;
pub mod record;
pub mod saving;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod graph;
#[cfg(feature = "web")]
pub mod login;
#[cfg(feature = "web")]
pub mod store;
#[cfg(feature = "web")]
pub mod students;

pub use error::{Error, Result};
pub use record::{FIELDS, Student, StudentPayload};
