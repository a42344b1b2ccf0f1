/*!
# Student Portal

A small web application that looks up student records from a spreadsheet and
renders a profile page, a roster summary and a directory browser.

## Overview

The student table is read once at startup from a CSV file or an Excel
workbook, normalised and sorted by roll number. After that it is read-only:
every request works against the same in-memory roster.

## Architecture

### Record Store
- **loader**: reads the first worksheet of a workbook, or a CSV file, into a header row plus data rows
- **roster**: turns those rows into `StudentRecord`s, sorted by roll number, with exact and range lookups

### Aggregator
- **marks**: recognises mark columns (five fixed subject names, or any `sub_<Subject>` column) and computes the percentage score

### Session Cursor
- **cursor**: per-browser "current student" pointer used by the *next* button, keyed by a session cookie

### File Lister
- **files**: non-recursive directory listings confined to one browse root

### Request Handlers
- **views**: the view models every page is rendered from
- **portal**: composes roster, cursor and lister into the three page models
- **app**: axum routing, template rendering and request logging

## REST API Endpoints

- `GET /` - Roster summary and a listing of the browse root
- `POST /` - Search by `rollNumber`, or by `startRollNumber` + `endRollNumber`
- `GET /next` - The student after the one last viewed in this session
- `GET /browse/{path}` - Listing of a directory under the browse root (404 if missing)
- `GET /static/...` - Static assets; photos live under `static/photos/`
*/

pub mod app;
pub mod config;
pub mod cursor;
pub mod error;
pub mod files;
pub mod loader;
pub mod marks;
pub mod portal;
pub mod roster;
pub mod views;

pub use error::{AppError, BrowseError, LoadError};
pub use portal::Portal;
pub use roster::{RangeOrdering, Roster, StudentRecord};
