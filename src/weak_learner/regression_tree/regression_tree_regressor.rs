use serde::{Serialize, Deserialize};

use crate::{error::Result, Regressor, Sample};
use super::node::*;

use std::fs::File;
use std::io::prelude::*;
use std::path::Path;


/// Regression Tree regressor.
/// This struct is just a wrapper of `Node`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTreeRegressor {
    root: Node,
}


impl From<Box<Node>> for RegressionTreeRegressor {
    #[inline]
    fn from(root: Box<Node>) -> Self {
        Self { root: *root }
    }
}


impl Regressor for RegressionTreeRegressor {
    fn predict(&self, sample: &Sample, row: usize) -> f64 {
        self.root.predict(sample, row)
    }
}


impl RegressionTreeRegressor {
    /// Returns the depth of the tree. A single leaf has depth `0`.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }


    /// Returns the number of leaves.
    pub fn n_leaves(&self) -> usize {
        self.root.n_leaves()
    }


    /// Write the current regression tree to dot file.
    pub fn to_dot_file<P>(&self, path: P) -> Result<()>
        where P: AsRef<Path>
    {
        let mut f = File::create(path)?;
        f.write_all(b"graph RegressionTree {\n")?;

        for row in self.root.to_dot_info(0).0 {
            f.write_all(row.as_bytes())?;
        }

        f.write_all(b"}\n")?;
        Ok(())
    }
}
