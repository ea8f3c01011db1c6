mod crypt;
mod save;
