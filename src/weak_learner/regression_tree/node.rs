//! A node struct used in the regression tree algorithm.
use serde::{Serialize, Deserialize};

use crate::{Regressor, Sample};
use super::split_rule::*;


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) enum Node {
    Branch {
        splitter:   Splitter,
        left:       Box<Node>,
        right:      Box<Node>,
        prediction: f64,
    },
    Leaf {
        prediction: f64,
    },
}


impl Node {
    pub(crate) fn branch(
        splitter:   Splitter,
        left:       Box<Node>,
        right:      Box<Node>,
        prediction: f64,
    ) -> Self
    {
        Self::Branch { splitter, left, right, prediction, }
    }


    pub(crate) fn leaf(prediction: f64) -> Self {
        Self::Leaf { prediction, }
    }


    pub(crate) fn depth(&self) -> usize {
        match self {
            Self::Branch { left, right, .. } => {
                1 + left.depth().max(right.depth())
            },
            Self::Leaf { .. } => 0,
        }
    }


    pub(crate) fn n_leaves(&self) -> usize {
        match self {
            Self::Branch { left, right, .. } => {
                left.n_leaves() + right.n_leaves()
            },
            Self::Leaf { .. } => 1,
        }
    }


    pub(crate) fn to_dot_info(&self, id: usize) -> (Vec<String>, usize) {
        match self {
            Node::Branch { splitter, left, right, .. } => {
                let splitter = format!(
                    "\tnode_{id} [ label = \"x{feat} < {thr:.2} ?\" ];\n",
                    feat = splitter.feature,
                    thr  = splitter.threshold,
                );

                let left_id = id + 1;
                let (     left,  right_id) = left.to_dot_info(left_id);
                let (mut right, return_id) = right.to_dot_info(right_id);

                let mut info = left;
                info.push(splitter);
                info.append(&mut right);

                info.push(format!(
                    "\tnode_{id} -- node_{left_id} [ label = \"Yes\" ];\n",
                ));
                info.push(format!(
                    "\tnode_{id} -- node_{right_id} [ label = \"No\" ];\n",
                ));

                (info, return_id)
            },
            Node::Leaf { prediction } => {
                let info = format!(
                    "\tnode_{id} [ label = \"{prediction:.4}\", shape = box ];\n",
                );

                (vec![info], id + 1)
            }
        }
    }
}


impl Regressor for Node {
    fn predict(&self, sample: &Sample, row: usize) -> f64 {
        match self {
            Self::Branch { splitter, left, right, .. } => {
                match splitter.split(sample, row) {
                    LeftRight::Left  => left.predict(sample, row),
                    LeftRight::Right => right.predict(sample, row),
                }
            },
            Self::Leaf { prediction } => *prediction,
        }
    }
}
