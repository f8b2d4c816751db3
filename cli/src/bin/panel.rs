// Copyright 2025 The Soulsoup Authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! The attribute panel: four ratings in, a similarity-ranked list out.

use anyhow::Result;
use clap::Parser;

use soulsoup_cli::{init_tracing, prompt_attributes, Args, Context};

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let context = Context::init(&args)?;

    let attributes = prompt_attributes()?;
    let query = context.embedder.run(attributes.to_mood_text())?.normalize()?;
    let recommendations = context
        .system
        .recommend_by_similarity(&context.corpus, &query, None);

    println!();
    for (rank, recommendation) in recommendations.iter().enumerate() {
        println!(
            "{}. {} (similarity {:.3})",
            rank + 1,
            recommendation.entry.text,
            recommendation.scores.similarity,
        );
    }

    Ok(())
}
