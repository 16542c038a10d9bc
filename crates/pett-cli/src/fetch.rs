// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use std::fs::File;
use std::path::Path;
use std::process::ExitCode;

const N_INSTANCES: usize = 24;
const DEFAULT_DIR: &str = "instances";
const BASE_URL: &str =
    "https://www.cs.qub.ac.uk/itc2007/postenrolcourse/initialdatasets";

/// Download the benchmark instances into the given directory (created if
/// missing).
pub fn fetch(directory: Option<&Path>) -> ExitCode {
    let dir = directory.unwrap_or(Path::new(DEFAULT_DIR));
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("could not create {}: {}", dir.display(), e);
        return ExitCode::from(super::EXIT_IO);
    }

    for i in 1..=N_INSTANCES {
        let filename = format!("comp-2007-2-{i}.tim");
        let url = format!("{BASE_URL}/{filename}");
        let path = dir.join(&filename);

        let response = match reqwest::blocking::get(&url) {
            Ok(response) => response,
            Err(e) => {
                eprintln!("could not fetch {url}: {e}");
                return ExitCode::from(super::EXIT_IO);
            }
        };
        if !response.status().is_success() {
            eprintln!("got HTTP {} for {url}; expected 200 OK", response.status());
            return ExitCode::from(super::EXIT_IO);
        }

        let mut file = match File::create(&path) {
            Ok(file) => file,
            Err(e) => {
                eprintln!("could not create {}: {}", path.display(), e);
                return ExitCode::from(super::EXIT_IO);
            }
        };
        let mut body = response;
        match std::io::copy(&mut body, &mut file) {
            Ok(bytes) => {
                tracing::info!(file = %path.display(), bytes, "downloaded instance");
            }
            Err(e) => {
                eprintln!("could not write {}: {}", path.display(), e);
                return ExitCode::from(super::EXIT_IO);
            }
        }
    }

    ExitCode::SUCCESS
}
